//! The cart store: stock-validated mutations over a persistent snapshot.
//!
//! [`CartStore`] owns the cart snapshot. It is loaded once from storage at
//! construction, mutated only through [`CartStore::add_product`],
//! [`CartStore::remove_product`] and [`CartStore::update_product_amount`],
//! and written back after every committed mutation. Observers subscribe to a
//! watch channel and re-render from each committed snapshot.
//!
//! Mutations are serialized through an internal async mutex that is held
//! across the catalog lookup. Two overlapping operations therefore cannot
//! interleave their read-modify-write cycles and drop each other's commits.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{instrument, warn};

use shopfront_core::{Cart, CartItem, ProductId};

use crate::catalog::{Catalog, CatalogError};
use crate::notify::NotificationSink;
use crate::storage::Storage;

/// Fixed persistence key for the cart snapshot.
pub const CART_KEY: &str = "shopfront:cart";

// User-facing messages, one per failure category and operation.
const MSG_OUT_OF_STOCK: &str = "requested quantity out of stock";
const MSG_ADD_FAILED: &str = "error adding product";
const MSG_REMOVE_FAILED: &str = "error removing product";
const MSG_UPDATE_FAILED: &str = "error updating product quantity";

/// What a committed mutation did to the snapshot.
///
/// `changed()` is the explicit dirty flag: persistence and observer
/// notification happen exactly when it is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
    /// A new line was appended with amount 1.
    Added(ProductId),
    /// An existing line's amount grew by 1.
    Incremented { id: ProductId, amount: u32 },
    /// A line was removed.
    Removed(ProductId),
    /// A line's amount was set to an explicit value.
    AmountSet { id: ProductId, amount: u32 },
    /// Nothing happened (e.g., a non-positive target amount).
    Unchanged,
}

impl CartUpdate {
    /// Whether the mutation changed the snapshot.
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Why a mutation was not committed.
///
/// Every variant leaves the snapshot exactly as it was. The store also
/// pushes a generic user-facing message to the notification sink, so a
/// caller may ignore this value entirely and still get toast-style errors.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The requested quantity is not covered by the available stock.
    #[error("requested quantity out of stock")]
    OutOfStock,

    /// The product is not in the cart (remove/update of an absent line).
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The stock/product lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Which operation a failure belongs to, for the sink message.
#[derive(Clone, Copy)]
enum Op {
    Add,
    Remove,
    Update,
}

/// Stock-validated cart store with durable local persistence.
pub struct CartStore<C, S> {
    catalog: C,
    storage: S,
    sink: Arc<dyn NotificationSink>,
    cart: Mutex<Cart>,
    snapshot: watch::Sender<Cart>,
}

impl<C, S> CartStore<C, S>
where
    C: Catalog,
    S: Storage,
{
    /// Create a store, loading the initial snapshot from storage.
    ///
    /// A missing or unparsable snapshot falls back to an empty cart; the
    /// fallback is logged but is never an error.
    pub fn new(catalog: C, storage: S, sink: impl NotificationSink + 'static) -> Self {
        let cart = Self::load_initial(&storage);
        let (snapshot, _) = watch::channel(cart.clone());

        Self {
            catalog,
            storage,
            sink: Arc::new(sink),
            cart: Mutex::new(cart),
            snapshot,
        }
    }

    fn load_initial(storage: &S) -> Cart {
        match storage.load(CART_KEY) {
            Ok(Some(payload)) => serde_json::from_str(&payload).unwrap_or_else(|e| {
                warn!(error = %e, "stored cart snapshot is unparsable, starting empty");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "failed to load cart snapshot, starting empty");
                Cart::new()
            }
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to committed snapshots.
    ///
    /// The receiver holds the latest snapshot immediately and is notified on
    /// every committed mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.snapshot.subscribe()
    }

    /// Add one unit of a product to the cart.
    ///
    /// A product already in the cart has its amount incremented by 1; a new
    /// product is appended with amount 1 after its metadata is fetched. The
    /// increment is rejected when the owned amount already reaches the
    /// available stock.
    ///
    /// # Errors
    ///
    /// [`CartError::OutOfStock`] on the stock rejection,
    /// [`CartError::Catalog`] when a lookup fails. The snapshot is unchanged
    /// on every error path.
    #[instrument(skip(self))]
    pub async fn add_product(&self, id: ProductId) -> Result<CartUpdate, CartError> {
        let mut cart = self.cart.lock().await;
        let result = self.try_add(&mut cart, id).await;
        self.finish(&mut cart, Op::Add, result)
    }

    async fn try_add(&self, cart: &mut Cart, id: ProductId) -> Result<CartUpdate, CartError> {
        let stock = self.catalog.stock(id).await?;

        if let Some(item) = cart.get_mut(id) {
            if item.amount >= stock.amount {
                return Err(CartError::OutOfStock);
            }
            item.amount += 1;
            let amount = item.amount;
            return Ok(CartUpdate::Incremented { id, amount });
        }

        let product = self.catalog.product(id).await?;
        cart.push(CartItem::from(product));
        Ok(CartUpdate::Added(id))
    }

    /// Remove a product line from the cart.
    ///
    /// No stock check is needed for removal.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`] when no line has the given id; the snapshot
    /// is unchanged in that case.
    #[instrument(skip(self))]
    pub async fn remove_product(&self, id: ProductId) -> Result<CartUpdate, CartError> {
        let mut cart = self.cart.lock().await;
        let result = match cart.remove(id) {
            Some(_) => Ok(CartUpdate::Removed(id)),
            None => Err(CartError::NotInCart(id)),
        };
        self.finish(&mut cart, Op::Remove, result)
    }

    /// Set a product line's amount to an explicit target.
    ///
    /// A non-positive target is a silent no-op (success, nothing persisted,
    /// no notification). A positive target must be strictly below the
    /// available stock.
    ///
    /// # Errors
    ///
    /// [`CartError::OutOfStock`] when the target reaches the available
    /// stock, [`CartError::NotInCart`] when the line is absent (an
    /// inconsistent-state update), [`CartError::Catalog`] when the stock
    /// lookup fails. The snapshot is unchanged on every error path.
    #[instrument(skip(self))]
    pub async fn update_product_amount(
        &self,
        id: ProductId,
        amount: i64,
    ) -> Result<CartUpdate, CartError> {
        if amount <= 0 {
            return Ok(CartUpdate::Unchanged);
        }

        let mut cart = self.cart.lock().await;
        let result = self.try_update(&mut cart, id, amount).await;
        self.finish(&mut cart, Op::Update, result)
    }

    async fn try_update(
        &self,
        cart: &mut Cart,
        id: ProductId,
        amount: i64,
    ) -> Result<CartUpdate, CartError> {
        let stock = self.catalog.stock(id).await?;
        if amount >= i64::from(stock.amount) {
            return Err(CartError::OutOfStock);
        }
        // amount is positive and below a u32 bound here
        let target = u32::try_from(amount).unwrap_or(u32::MAX);

        let Some(item) = cart.get_mut(id) else {
            return Err(CartError::NotInCart(id));
        };
        item.amount = target;
        Ok(CartUpdate::AmountSet { id, amount: target })
    }

    /// Commit a successful mutation or report a failure to the sink.
    fn finish(
        &self,
        cart: &mut Cart,
        op: Op,
        result: Result<CartUpdate, CartError>,
    ) -> Result<CartUpdate, CartError> {
        match &result {
            Ok(update) if update.changed() => self.commit(cart),
            Ok(_) => {}
            Err(err) => self.notify_failure(op, err),
        }
        result
    }

    /// Persist the snapshot and publish it to observers.
    ///
    /// A storage failure never fails the mutation: the in-memory snapshot
    /// still advances and the next commit rewrites the full payload.
    fn commit(&self, cart: &Cart) {
        match serde_json::to_string(cart) {
            Ok(payload) => {
                if let Err(e) = self.storage.save(CART_KEY, &payload) {
                    warn!(error = %e, "failed to persist cart snapshot");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize cart snapshot"),
        }
        self.snapshot.send_replace(cart.clone());
    }

    fn notify_failure(&self, op: Op, err: &CartError) {
        let message = match (op, err) {
            (_, CartError::OutOfStock) => MSG_OUT_OF_STOCK,
            (Op::Add, _) => MSG_ADD_FAILED,
            (Op::Remove, _) => MSG_REMOVE_FAILED,
            (Op::Update, _) => MSG_UPDATE_FAILED,
        };
        self.sink.error(message);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;

    use shopfront_core::{Product, StockRecord};

    use super::*;
    use crate::storage::MemoryStorage;

    /// Catalog fake over fixed product/stock tables.
    #[derive(Default)]
    struct FakeCatalog {
        stock: HashMap<ProductId, u32>,
        products: HashMap<ProductId, Product>,
    }

    impl FakeCatalog {
        fn with_product(mut self, id: i64, price: &str, stock: u32) -> Self {
            let id = ProductId::new(id);
            self.stock.insert(id, stock);
            self.products.insert(
                id,
                Product {
                    id,
                    title: format!("Product {id}"),
                    price: price.parse::<Decimal>().unwrap(),
                    image: format!("https://cdn.example.com/{id}.jpg"),
                },
            );
            self
        }
    }

    impl Catalog for FakeCatalog {
        async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
            self.stock
                .get(&id)
                .map(|&amount| StockRecord { id, amount })
                .ok_or(CatalogError::NotFound(id))
        }

        async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
            self.products
                .get(&id)
                .cloned()
                .ok_or(CatalogError::NotFound(id))
        }
    }

    /// Sink that records every message for inspection.
    #[derive(Clone, Default)]
    struct RecordingSink {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn error(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn store_with(
        catalog: FakeCatalog,
        storage: MemoryStorage,
    ) -> (CartStore<FakeCatalog, MemoryStorage>, RecordingSink) {
        let sink = RecordingSink::default();
        let store = CartStore::new(catalog, storage, sink.clone());
        (store, sink)
    }

    #[tokio::test]
    async fn test_add_new_product_appends_with_amount_one() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let (store, sink) = store_with(catalog, MemoryStorage::new());

        let update = store.add_product(ProductId::new(1)).await.unwrap();

        assert_eq!(update, CartUpdate::Added(ProductId::new(1)));
        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].amount, 1);
        assert_eq!(cart.items()[0].title, "Product 1");
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_by_one() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let (store, _sink) = store_with(catalog, MemoryStorage::new());

        store.add_product(ProductId::new(1)).await.unwrap();
        let update = store.add_product(ProductId::new(1)).await.unwrap();

        assert_eq!(
            update,
            CartUpdate::Incremented {
                id: ProductId::new(1),
                amount: 2
            }
        );
        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart().items()[0].amount, 2);
    }

    #[tokio::test]
    async fn test_add_at_stock_limit_is_rejected() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 2);
        let (store, sink) = store_with(catalog, MemoryStorage::new());

        store.add_product(ProductId::new(1)).await.unwrap();
        store.add_product(ProductId::new(1)).await.unwrap();
        let before = store.cart();

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, CartError::OutOfStock));
        assert_eq!(store.cart(), before);
        assert_eq!(sink.messages(), vec![MSG_OUT_OF_STOCK.to_string()]);
    }

    #[tokio::test]
    async fn test_add_unknown_product_reports_generic_message() {
        let catalog = FakeCatalog::default();
        let (store, sink) = store_with(catalog, MemoryStorage::new());

        let err = store.add_product(ProductId::new(9)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::Catalog(CatalogError::NotFound(_))
        ));
        assert!(store.cart().is_empty());
        assert_eq!(sink.messages(), vec![MSG_ADD_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_remove_deletes_exactly_the_matching_line() {
        let catalog = FakeCatalog::default()
            .with_product(1, "19.99", 5)
            .with_product(2, "54.90", 5);
        let (store, _sink) = store_with(catalog, MemoryStorage::new());
        store.add_product(ProductId::new(1)).await.unwrap();
        store.add_product(ProductId::new(2)).await.unwrap();

        let update = store.remove_product(ProductId::new(1)).await.unwrap();

        assert_eq!(update, CartUpdate::Removed(ProductId::new(1)));
        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id, ProductId::new(2));
    }

    #[tokio::test]
    async fn test_remove_absent_product_errors_without_mutating() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let (store, sink) = store_with(catalog, MemoryStorage::new());
        store.add_product(ProductId::new(1)).await.unwrap();
        let before = store.cart();

        let err = store.remove_product(ProductId::new(2)).await.unwrap_err();

        assert!(matches!(err, CartError::NotInCart(_)));
        assert_eq!(store.cart(), before);
        assert_eq!(sink.messages(), vec![MSG_REMOVE_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_remove_is_not_idempotent_but_stays_safe() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let (store, sink) = store_with(catalog, MemoryStorage::new());
        store.add_product(ProductId::new(1)).await.unwrap();

        store.remove_product(ProductId::new(1)).await.unwrap();
        let err = store.remove_product(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, CartError::NotInCart(_)));
        assert!(store.cart().is_empty());
        assert_eq!(sink.messages(), vec![MSG_REMOVE_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_update_with_non_positive_amount_is_a_silent_noop() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let storage = MemoryStorage::new();
        let (store, sink) = store_with(catalog, storage);
        store.add_product(ProductId::new(1)).await.unwrap();
        store.add_product(ProductId::new(1)).await.unwrap();
        let saves_before = store.storage.save_count();

        let update = store
            .update_product_amount(ProductId::new(1), 0)
            .await
            .unwrap();

        assert_eq!(update, CartUpdate::Unchanged);
        assert!(!update.changed());
        assert_eq!(store.cart().items()[0].amount, 2);
        // no persistence write for a no-op
        assert_eq!(store.storage.save_count(), saves_before);
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_at_or_above_stock_is_rejected() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let (store, sink) = store_with(catalog, MemoryStorage::new());
        store.add_product(ProductId::new(1)).await.unwrap();

        let err = store
            .update_product_amount(ProductId::new(1), 5)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::OutOfStock));
        assert_eq!(store.cart().items()[0].amount, 1);
        assert_eq!(sink.messages(), vec![MSG_OUT_OF_STOCK.to_string()]);
    }

    #[tokio::test]
    async fn test_update_sets_the_exact_amount() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let (store, _sink) = store_with(catalog, MemoryStorage::new());
        store.add_product(ProductId::new(1)).await.unwrap();

        let update = store
            .update_product_amount(ProductId::new(1), 4)
            .await
            .unwrap();

        assert_eq!(
            update,
            CartUpdate::AmountSet {
                id: ProductId::new(1),
                amount: 4
            }
        );
        assert_eq!(store.cart().items()[0].amount, 4);
    }

    #[tokio::test]
    async fn test_update_of_absent_product_reports_inconsistency() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let (store, sink) = store_with(catalog, MemoryStorage::new());

        let err = store
            .update_product_amount(ProductId::new(1), 2)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::NotInCart(_)));
        assert!(store.cart().is_empty());
        assert_eq!(sink.messages(), vec![MSG_UPDATE_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_snapshot_persists_and_reloads() {
        let storage = MemoryStorage::new();
        {
            let catalog = FakeCatalog::default()
                .with_product(1, "19.99", 5)
                .with_product(2, "54.90", 5);
            let (store, _sink) = store_with(catalog, storage);
            store.add_product(ProductId::new(1)).await.unwrap();
            store.add_product(ProductId::new(2)).await.unwrap();
            store.add_product(ProductId::new(1)).await.unwrap();

            // Rebuild a store over the same persisted payload.
            let payload = store.storage.load(CART_KEY).unwrap().unwrap();
            let reloaded = MemoryStorage::with_entry(CART_KEY, &payload);
            let (fresh, _) = store_with(FakeCatalog::default(), reloaded);

            assert_eq!(fresh.cart(), store.cart());
            let ids: Vec<_> = fresh.cart().items().iter().map(|i| i.id).collect();
            assert_eq!(ids, vec![ProductId::new(1), ProductId::new(2)]);
            assert_eq!(fresh.cart().items()[0].amount, 2);
        }
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_falls_back_to_empty() {
        let storage = MemoryStorage::with_entry(CART_KEY, "{not json");
        let (store, sink) = store_with(FakeCatalog::default(), storage);

        assert!(store.cart().is_empty());
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_observe_each_commit() {
        let catalog = FakeCatalog::default().with_product(1, "19.99", 5);
        let (store, _sink) = store_with(catalog, MemoryStorage::new());
        let mut rx = store.subscribe();

        assert!(rx.borrow().is_empty());

        store.add_product(ProductId::new(1)).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().total_quantity(), 1);

        store.remove_product(ProductId::new(1)).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }
}

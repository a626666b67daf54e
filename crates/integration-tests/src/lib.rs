//! Shared test doubles for the Shopfront integration tests.
//!
//! The fakes here stand in for the two external collaborators of the cart
//! store: the remote catalog and the notification sink. Storage doubles come
//! from `shopfront_cart` itself (`MemoryStorage`, `JsonFileStorage`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use shopfront_cart::{Catalog, CatalogError, NotificationSink};
use shopfront_core::{Product, ProductId, StockRecord};

/// Catalog fake over fixed product/stock tables.
///
/// Stock amounts can be changed between operations to simulate external
/// stock movement.
#[derive(Debug, Clone, Default)]
pub struct FakeCatalog {
    entries: Arc<Mutex<HashMap<ProductId, (Product, u32)>>>,
}

impl FakeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with its available stock.
    #[must_use]
    pub fn with_product(self, id: i64, title: &str, price: &str, stock: u32) -> Self {
        let id = ProductId::new(id);
        let product = Product {
            id,
            title: title.to_string(),
            price: price.parse::<Decimal>().expect("test price"),
            image: format!("https://cdn.example.com/{id}.jpg"),
        };
        self.entries
            .lock()
            .expect("catalog lock")
            .insert(id, (product, stock));
        self
    }

    /// Change the available stock of a registered product.
    ///
    /// # Panics
    ///
    /// Panics when the product was never registered.
    pub fn set_stock(&self, id: i64, stock: u32) {
        let id = ProductId::new(id);
        let mut entries = self.entries.lock().expect("catalog lock");
        let entry = entries.get_mut(&id).expect("unknown product in fake");
        entry.1 = stock;
    }
}

impl Catalog for FakeCatalog {
    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
        self.entries
            .lock()
            .expect("catalog lock")
            .get(&id)
            .map(|&(_, amount)| StockRecord { id, amount })
            .ok_or(CatalogError::NotFound(id))
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.entries
            .lock()
            .expect("catalog lock")
            .get(&id)
            .map(|(product, _)| product.clone())
            .ok_or(CatalogError::NotFound(id))
    }
}

/// Sink that records every message for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages delivered so far, in order.
    ///
    /// # Panics
    ///
    /// Panics when the sink lock is poisoned.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("sink lock").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn error(&self, message: &str) {
        self.messages.lock().expect("sink lock").push(message.to_string());
    }
}

//! Cart line items and the cart snapshot.
//!
//! A [`Cart`] is an ordered sequence of [`CartItem`]s, unique by product id,
//! with insertion order preserved. The serialized form is exactly a JSON
//! array of item records, which is also the persistence format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::id::ProductId;

/// One product line in the cart.
///
/// `amount` is the owned quantity and is always at least 1; a line that
/// would drop to zero is removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    /// Unit price. Money is decimal, never a float.
    pub price: Decimal,
    pub image: String,
    pub amount: u32,
}

impl CartItem {
    /// Total price of this line (`price * amount`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

impl From<Product> for CartItem {
    /// Build a fresh cart line from catalog metadata, with `amount = 1`.
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount: 1,
        }
    }
}

/// The cart snapshot: an ordered sequence of [`CartItem`], unique by id.
///
/// Owned exclusively by the cart store; everything else reads clones. The
/// `#[serde(transparent)]` representation means a cart persists and
/// round-trips as a plain JSON array of item records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Read-only view of the line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct product lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line item by product id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Mutable access to a line item by product id.
    pub fn get_mut(&mut self, id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Append a new line item.
    ///
    /// The caller must have checked that no line with the same id exists;
    /// duplicate ids would break the uniqueness invariant.
    pub fn push(&mut self, item: CartItem) {
        debug_assert!(self.get(item.id).is_none(), "duplicate product id in cart");
        self.items.push(item);
    }

    /// Remove the line item with the given id, returning it if present.
    pub fn remove(&mut self, id: ProductId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

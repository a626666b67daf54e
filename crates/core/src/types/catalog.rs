//! Records returned by the remote catalog.
//!
//! These mirror the wire format of the catalog's REST API
//! (`/products/{id}` and `/stock/{id}`). Stock is external truth for the
//! maximum purchasable quantity and is fetched on demand, never cached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Product metadata as served by `/products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image: String,
}

/// Available stock for one product, as served by `/stock/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: ProductId,
    pub amount: u32,
}

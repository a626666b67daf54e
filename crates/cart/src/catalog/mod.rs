//! Remote stock/product catalog.
//!
//! The catalog is the external truth for product metadata and purchasable
//! stock. Lookups always hit the remote source; responses are never cached,
//! so a stock check reflects the catalog at the moment of the call.

mod http;

pub use http::HttpCatalog;

use thiserror::Error;

use shopfront_core::{Product, ProductId, StockRecord};

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP transport or body-decode failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: status {0}")]
    Status(u16),

    /// No product/stock record exists for the id.
    #[error("product {0} not found")]
    NotFound(ProductId),
}

/// Read-only lookups against the remote catalog.
pub trait Catalog {
    /// Fetch the current stock record for a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the record does not exist, the request
    /// fails, or the response body is malformed.
    fn stock(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<StockRecord, CatalogError>> + Send;

    /// Fetch product metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the product does not exist, the request
    /// fails, or the response body is malformed.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send;
}

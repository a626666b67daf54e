//! HTTP implementation of the catalog against a REST API.
//!
//! Endpoints: `GET {base}/stock/{id}` and `GET {base}/products/{id}`, both
//! returning JSON. A 404 maps to [`CatalogError::NotFound`]; any other
//! non-success status maps to [`CatalogError::Status`].

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use shopfront_core::{Product, ProductId, StockRecord};

use super::{Catalog, CatalogError};
use crate::config::CatalogConfig;

/// Catalog client over a REST API.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and decode one resource.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        id: ProductId,
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{path}/{id}", self.base_url);
        debug!(%url, "catalog request");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        Ok(response.json::<T>().await?)
    }
}

impl Catalog for HttpCatalog {
    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
        self.get_json("stock", id).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get_json("products", id).await
    }
}

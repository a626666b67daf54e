//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_BASE_URL` - Base URL of the catalog REST API
//!   (e.g., <http://localhost:3333>)
//!
//! ## Optional
//! - `CART_STORAGE_DIR` - Directory for persisted cart snapshots
//!   (default: `.shopfront`)

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default directory for persisted snapshots.
const DEFAULT_STORAGE_DIR: &str = ".shopfront";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog REST API.
    pub base_url: Url,
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Remote catalog configuration.
    pub catalog: CatalogConfig,
    /// Directory holding persisted cart snapshots.
    pub storage_dir: PathBuf,
}

impl CartConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `CATALOG_BASE_URL` is missing or is not
    /// a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_base_url = env::var("CATALOG_BASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("CATALOG_BASE_URL".to_string()))?;
        let base_url = Url::parse(&raw_base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_BASE_URL".to_string(), e.to_string()))?;

        let storage_dir = env::var("CART_STORAGE_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);

        Ok(Self {
            catalog: CatalogConfig { base_url },
            storage_dir,
        })
    }
}

//! Shopfront Cart - stock-validated cart store.
//!
//! This crate maintains an in-memory cart snapshot, validates quantity
//! changes against a remote stock source before committing them, and
//! synchronizes every committed snapshot to durable local storage.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the snapshot and exposes the three mutations
//!   (`add_product`, `remove_product`, `update_product_amount`)
//! - [`Catalog`] is the remote stock/product lookup (HTTP in production)
//! - [`Storage`] is a synchronous key-value layer for the serialized snapshot
//! - [`NotificationSink`] receives the user-facing error messages
//!
//! Mutations return structured outcomes instead of throwing: the caller gets
//! a `Result<CartUpdate, CartError>` and can decide how to surface failures,
//! while the injected sink still receives the generic message each failure
//! has always produced.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_cart::{CartStore, HttpCatalog, JsonFileStorage, TracingSink};
//! use shopfront_core::ProductId;
//!
//! let catalog = HttpCatalog::new(&config.catalog)?;
//! let storage = JsonFileStorage::new(&config.storage_dir);
//! let store = CartStore::new(catalog, storage, TracingSink);
//!
//! store.add_product(ProductId::new(1)).await?;
//! println!("{} items", store.cart().total_quantity());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod notify;
pub mod storage;
pub mod store;

pub use catalog::{Catalog, CatalogError, HttpCatalog};
pub use config::{CartConfig, ConfigError};
pub use notify::{NotificationSink, NullSink, TracingSink};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
pub use store::{CART_KEY, CartError, CartStore, CartUpdate};

//! Shared type definitions.
//!
//! - [`id`] - Newtype ID wrappers via the `define_id!` macro
//! - [`cart`] - Cart line items and the cart snapshot
//! - [`catalog`] - Records returned by the remote catalog

pub mod cart;
pub mod catalog;
pub mod id;

pub use cart::{Cart, CartItem};
pub use catalog::{Product, StockRecord};
pub use id::ProductId;

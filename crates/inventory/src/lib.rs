//! Inventory domain module.
//!
//! Holds the product catalog: the arena that owns every [`Product`] record and
//! hands out locks over them. Carts and checkouts refer to products by id only.
//!
//! [`Product`]: shopfront_products::Product

pub mod catalog;

pub use catalog::{Catalog, ProductLocks};

//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a rejection of the requested operation. Nothing here is a
/// crash; callers decide how to surface or log it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Checkout was requested for a cart without lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line references a product past its expiry date.
    #[error("product expired: {0}")]
    ProductExpired(String),

    /// Stock no longer covers the requested quantity.
    #[error("insufficient stock for {0}")]
    InsufficientStock(String),

    /// The customer cannot afford the requested amount.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// A cart add (or merge) would exceed the product's current stock.
    #[error("requested {requested} of {product} but only {available} in stock")]
    ExceedsStock {
        product: String,
        requested: u32,
        available: u32,
    },

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A handle did not resolve to a record.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal consistency fault (poisoned lock, failed commit).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn exceeds_stock(product: impl Into<String>, requested: u32, available: u32) -> Self {
        Self::ExceedsStock {
            product: product.into(),
            requested,
            available,
        }
    }
}

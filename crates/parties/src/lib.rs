//! Parties domain module (customers).
//!
//! This crate contains business rules for customer accounts, implemented purely
//! as deterministic domain logic (no IO, no storage).

pub mod accounts;
pub mod customer;

pub use accounts::CustomerAccounts;
pub use customer::{Customer, RegisterCustomer};

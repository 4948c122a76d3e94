//! Sales domain module: carts, shipping fees, and checkout.
//!
//! Checkout is the only operation here that mutates shared records (customer
//! balances and product stock). See [`checkout`] for the ordering and locking
//! rules it follows.

pub mod cart;
pub mod checkout;
pub mod receipt;
pub mod shipping;

pub use cart::{Cart, CartLine};
pub use checkout::CheckoutService;
pub use receipt::{Receipt, ReceiptLine};
pub use shipping::{
    ManifestEntry, ShipmentManifest, ShippableUnit, ShippingCalculator, ShippingConfig,
};

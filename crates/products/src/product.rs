use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{DomainError, DomainResult, Entity, Money, ProductId, Weight};

/// Whether units of a product travel by courier, and how heavy each one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ShippingProfile {
    /// Picked up or delivered digitally; never contributes to the shipping fee.
    NotShipped,
    /// Each unit ships separately at `weight`.
    Shipped { weight: Weight },
}

/// Attributes every product carries regardless of variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    id: ProductId,
    name: String,
    unit_price: Money,
    stock: u32,
    shipping: ShippingProfile,
}

/// Catalog product.
///
/// The variant decides expiry behaviour; everything else lives in
/// [`ProductDetails`] and is reached through the accessors below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Product {
    Expirable {
        #[serde(flatten)]
        details: ProductDetails,
        expires_on: NaiveDate,
    },
    NonExpirable {
        #[serde(flatten)]
        details: ProductDetails,
    },
}

/// Command: CreateProduct.
///
/// `expires_on: Some(_)` yields [`Product::Expirable`], `None` yields
/// [`Product::NonExpirable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub stock: u32,
    pub shipping: ShippingProfile,
    pub expires_on: Option<NaiveDate>,
}

impl Product {
    pub fn create(cmd: CreateProduct) -> DomainResult<Self> {
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let details = ProductDetails {
            id: cmd.product_id,
            name: cmd.name,
            unit_price: cmd.unit_price,
            stock: cmd.stock,
            shipping: cmd.shipping,
        };

        Ok(match cmd.expires_on {
            Some(expires_on) => Product::Expirable {
                details,
                expires_on,
            },
            None => Product::NonExpirable { details },
        })
    }

    fn details(&self) -> &ProductDetails {
        match self {
            Product::Expirable { details, .. } | Product::NonExpirable { details } => details,
        }
    }

    fn details_mut(&mut self) -> &mut ProductDetails {
        match self {
            Product::Expirable { details, .. } | Product::NonExpirable { details } => details,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.details().id
    }

    pub fn name(&self) -> &str {
        &self.details().name
    }

    pub fn unit_price(&self) -> Money {
        self.details().unit_price
    }

    pub fn stock(&self) -> u32 {
        self.details().stock
    }

    pub fn shipping(&self) -> ShippingProfile {
        self.details().shipping
    }

    pub fn requires_shipping(&self) -> bool {
        matches!(self.shipping(), ShippingProfile::Shipped { .. })
    }

    /// Per-unit shipping weight, if the product ships at all.
    pub fn shipping_weight(&self) -> Option<Weight> {
        match self.shipping() {
            ShippingProfile::Shipped { weight } => Some(weight),
            ShippingProfile::NotShipped => None,
        }
    }

    pub fn expires_on(&self) -> Option<NaiveDate> {
        match self {
            Product::Expirable { expires_on, .. } => Some(*expires_on),
            Product::NonExpirable { .. } => None,
        }
    }

    /// Expired once `now` falls on a calendar day after the expiry date.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Product::Expirable { expires_on, .. } => now.date_naive() > *expires_on,
            Product::NonExpirable { .. } => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// The only path by which stock decreases.
    pub fn reduce_stock(&mut self, amount: u32) -> DomainResult<()> {
        if amount == 0 {
            return Err(DomainError::validation("amount must be positive"));
        }

        let details = self.details_mut();
        if amount > details.stock {
            return Err(DomainError::InsufficientStock(details.name.clone()));
        }
        details.stock -= amount;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id_typed()
    }
}

//! Value objects: equality by value, not identity.
//!
//! [`Money`] and [`Weight`] are the two value objects the checkout flow
//! computes with. Both wrap a [`Decimal`] and are non-negative by construction.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A non-negative amount in the shop's single currency.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "Decimal", try_from = "Decimal")]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation(format!(
                "amount cannot be negative: {amount}"
            )));
        }
        Ok(Self(amount))
    }

    /// Whole currency units.
    pub fn whole(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Line total for `quantity` units at this unit price. `None` on overflow.
    pub fn checked_times(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Price of `weight` at this per-kilogram rate. `None` on overflow.
    pub fn checked_per_kg(self, weight: Weight) -> Option<Money> {
        self.0.checked_mul(weight.0).map(Self)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Round up to the next whole currency unit.
    pub fn round_up(self) -> Self {
        Self(self.0.ceil())
    }

    /// `None` when `other` exceeds `self`.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        if other.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - other.0))
        }
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(amount: Decimal) -> DomainResult<Self> {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Decimal {
        money.0
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        )
    }
}

/// A non-negative mass in kilograms.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "Decimal", try_from = "Decimal")]
pub struct Weight(Decimal);

impl ValueObject for Weight {}

impl Weight {
    pub fn kilograms(kg: Decimal) -> DomainResult<Self> {
        if kg.is_sign_negative() && !kg.is_zero() {
            return Err(DomainError::validation(format!(
                "weight cannot be negative: {kg}"
            )));
        }
        Ok(Self(kg))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn kg(&self) -> Decimal {
        self.0
    }

    /// Weight in grams, rounded to the nearest gram. `None` on overflow.
    pub fn grams(&self) -> Option<Decimal> {
        self.0
            .checked_mul(Decimal::from(1000))
            .map(|g| g.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn checked_add(self, other: Weight) -> Option<Weight> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl TryFrom<Decimal> for Weight {
    type Error = DomainError;

    fn try_from(kg: Decimal) -> DomainResult<Self> {
        Self::kilograms(kg)
    }
}

impl From<Weight> for Decimal {
    fn from(weight: Weight) -> Decimal {
        weight.0
    }
}

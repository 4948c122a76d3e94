//! Weight-based shipping fee.
//!
//! The fee depends only on the total weight of the shipped units:
//! `ceil(total_kg * rate_per_kg)`, rounded up to a whole currency unit in the
//! seller's favour. No units means no fee at all.

use core::fmt;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use shopfront_core::{DomainError, DomainResult, Money, Weight};

/// Shipping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingConfig {
    rate_per_kg: Money,
}

impl ShippingConfig {
    pub const DEFAULT_RATE_PER_KG: u64 = 30;

    pub fn new(rate_per_kg: Decimal) -> DomainResult<Self> {
        Ok(Self {
            rate_per_kg: Money::new(rate_per_kg)?,
        })
    }

    pub fn rate_per_kg(&self) -> Money {
        self.rate_per_kg
    }
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            rate_per_kg: Money::whole(Self::DEFAULT_RATE_PER_KG),
        }
    }
}

/// One physical unit that needs shipping.
///
/// Units expanded from the same cart line share one label allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippableUnit {
    pub label: Arc<str>,
    pub weight: Weight,
}

impl ShippableUnit {
    pub fn new(label: impl Into<Arc<str>>, weight: Weight) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }
}

/// Manifest line: one per shipped unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub label: String,
    pub grams: Decimal,
}

/// Report of what ships. Not part of the fee contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentManifest {
    pub entries: Vec<ManifestEntry>,
    /// Total weight in kilograms, one decimal place.
    pub total_kg: Decimal,
}

impl ShipmentManifest {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ShipmentManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "** Shipment notice **")?;
        for entry in &self.entries {
            writeln!(f, "{} {}g", entry.label, entry.grams)?;
        }
        write!(f, "Total package weight {}kg", self.total_kg)
    }
}

/// Computes shipping fees from a fixed per-kilogram rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShippingCalculator {
    config: ShippingConfig,
}

impl ShippingCalculator {
    pub fn new(config: ShippingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ShippingConfig {
        self.config
    }

    pub fn calculate_fee(&self, units: &[ShippableUnit]) -> DomainResult<Money> {
        if units.is_empty() {
            return Ok(Money::zero());
        }
        let total = total_weight(units)?;
        self.config
            .rate_per_kg()
            .checked_per_kg(total)
            .map(Money::round_up)
            .ok_or_else(|| DomainError::invariant("shipping fee overflow"))
    }

    pub fn manifest(&self, units: &[ShippableUnit]) -> DomainResult<ShipmentManifest> {
        let entries = units
            .iter()
            .map(|unit| {
                let grams = unit
                    .weight
                    .grams()
                    .ok_or_else(|| DomainError::invariant("unit weight overflow"))?;
                Ok(ManifestEntry {
                    label: unit.label.to_string(),
                    grams,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(ShipmentManifest {
            entries,
            total_kg: total_weight(units)?
                .kg()
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
        })
    }
}

fn total_weight(units: &[ShippableUnit]) -> DomainResult<Weight> {
    units.iter().try_fold(Weight::zero(), |acc, unit| {
        acc.checked_add(unit.weight)
            .ok_or_else(|| DomainError::invariant("shipment weight overflow"))
    })
}

//! Process configuration read from the environment.

use core::str::FromStr;

use anyhow::Context;
use rust_decimal::Decimal;
use shopfront_sales::ShippingConfig;

/// Per-kilogram shipping rate, decimal. Unset means the built-in default.
pub const SHIPPING_RATE_ENV: &str = "SHOPFRONT_SHIPPING_RATE_PER_KG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub shipping: ShippingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let shipping = match lookup(SHIPPING_RATE_ENV) {
            Some(raw) => {
                let rate = Decimal::from_str(raw.trim())
                    .with_context(|| format!("{SHIPPING_RATE_ENV} is not a decimal: {raw:?}"))?;
                ShippingConfig::new(rate).with_context(|| format!("invalid {SHIPPING_RATE_ENV}"))?
            }
            None => {
                tracing::warn!(
                    "{SHIPPING_RATE_ENV} not set; using default rate of {} per kg",
                    ShippingConfig::DEFAULT_RATE_PER_KG
                );
                ShippingConfig::default()
            }
        };

        Ok(Self { shipping })
    }
}

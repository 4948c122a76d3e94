use core::fmt;

use serde::{Deserialize, Serialize};

use shopfront_core::{CustomerId, Money};

use crate::shipping::ShipmentManifest;

/// Receipt line: quantity, product name, line total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub quantity: u32,
    pub name: String,
    pub line_total: Money,
}

/// Outcome of a committed checkout.
///
/// Amounts are exact; `Display` rounds to two decimals for the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub customer_id: CustomerId,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub balance_after: Money,
    pub shipment: ShipmentManifest,
}

const WIDTH: usize = 32;

fn row(f: &mut fmt::Formatter<'_>, label: &str, amount: Money) -> fmt::Result {
    let amount = format!("{:.2}", amount.amount());
    let pad = WIDTH.saturating_sub(label.len() + amount.len()).max(1);
    writeln!(f, "{label}{:pad$}{amount}", "")
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.shipment.is_empty() {
            writeln!(f, "{}", self.shipment)?;
            writeln!(f)?;
        }
        writeln!(f, "** Checkout receipt **")?;
        for line in &self.lines {
            row(f, &format!("{}x {}", line.quantity, line.name), line.line_total)?;
        }
        writeln!(f, "{}", "-".repeat(WIDTH))?;
        row(f, "Subtotal", self.subtotal)?;
        row(f, "Shipping", self.shipping_fee)?;
        row(f, "Amount", self.total)?;
        row(f, "Balance", self.balance_after)
    }
}

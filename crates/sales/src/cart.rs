use serde::{Deserialize, Serialize};

use shopfront_core::{DomainError, DomainResult, Entity, Money, ProductId};
use shopfront_inventory::Catalog;
use shopfront_products::Product;

/// Cart line: product handle, quantity, and the price/name seen at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> DomainResult<Money> {
        self.unit_price
            .checked_times(self.quantity)
            .ok_or_else(|| DomainError::invariant(format!("line total overflow for {}", self.name)))
    }
}

/// Shopping cart. At most one line per product; lines keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a catalog product, checked against its
    /// current stock.
    pub fn add(
        &mut self,
        catalog: &Catalog,
        product_id: ProductId,
        quantity: u32,
    ) -> DomainResult<()> {
        let product = catalog.lock(product_id)?;
        self.add_product(&product, quantity)
    }

    /// Add `quantity` units of `product`.
    ///
    /// Both the requested quantity and, when a line for the same product
    /// already exists, the merged quantity must fit in `product`'s stock as
    /// passed in. On failure the cart is unchanged.
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let available = product.stock();
        if quantity > available {
            return Err(DomainError::exceeds_stock(product.name(), quantity, available));
        }

        let id = product.id();
        match self.lines.iter_mut().find(|line| line.product_id == id) {
            Some(line) => {
                let merged = line
                    .quantity
                    .checked_add(quantity)
                    .filter(|merged| *merged <= available)
                    .ok_or_else(|| {
                        DomainError::exceeds_stock(
                            product.name(),
                            line.quantity.saturating_add(quantity),
                            available,
                        )
                    })?;
                line.quantity = merged;
            }
            None => self.lines.push(CartLine {
                product_id: id,
                name: product.name().to_string(),
                unit_price: product.unit_price(),
                quantity,
            }),
        }
        Ok(())
    }

    /// Drop the line for `product_id`, returning it.
    pub fn remove(&mut self, product_id: ProductId) -> DomainResult<CartLine> {
        let idx = self
            .lines
            .iter()
            .position(|line| line.product_id == product_id)
            .ok_or_else(|| DomainError::not_found(format!("cart line for product {product_id}")))?;
        Ok(self.lines.remove(idx))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn subtotal(&self) -> DomainResult<Money> {
        self.lines.iter().try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.line_total()?)
                .ok_or_else(|| DomainError::invariant("cart subtotal overflow"))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
    }
}

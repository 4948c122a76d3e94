//! Checkout: validate, price, charge, and take stock, all or nothing.
//!
//! A checkout runs through these stages in order, stopping at the first
//! failure:
//!
//! 1. **Empty check**: a cart without lines is rejected with `EmptyCart`.
//! 2. **Validate lines**: every product must be unexpired and still have
//!    stock for the line's quantity.
//! 3. **Price**: subtotal plus a weight-based shipping fee. A line of
//!    quantity N that ships expands to N shippable units.
//! 4. **Affordability**: the customer's balance must cover the total.
//! 5. **Commit**: debit the customer, then reduce each product's stock.
//! 6. **Receipt**.
//!
//! Stages 2 through 5 run while holding the locks of every product in the
//! cart (ascending id) and then the customer's lock, so no concurrent checkout
//! can invalidate a check between validating and committing. Nothing is
//! mutated before stage 5. Amount arithmetic is checked, so an overflowing
//! cart is rejected like any other failure and leaves the locks usable. The
//! shipment manifest is built after the locks are released.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use shopfront_core::{CustomerId, DomainError, DomainResult, Money};
use shopfront_inventory::{Catalog, ProductLocks};
use shopfront_parties::{Customer, CustomerAccounts};

use crate::cart::{Cart, CartLine};
use crate::receipt::{Receipt, ReceiptLine};
use crate::shipping::{ShippableUnit, ShippingCalculator};

/// Orchestrates checkouts against a catalog and a set of customer accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutService {
    shipping: ShippingCalculator,
}

/// Amounts computed before anything is charged.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pricing {
    line_totals: Vec<Money>,
    subtotal: Money,
    shipping_fee: Money,
    total: Money,
    units: Vec<ShippableUnit>,
}

impl CheckoutService {
    pub fn new(shipping: ShippingCalculator) -> Self {
        Self { shipping }
    }

    pub fn shipping(&self) -> &ShippingCalculator {
        &self.shipping
    }

    pub fn checkout(
        &self,
        catalog: &Catalog,
        accounts: &CustomerAccounts,
        customer_id: CustomerId,
        cart: &Cart,
    ) -> DomainResult<Receipt> {
        self.checkout_at(catalog, accounts, customer_id, cart, Utc::now())
    }

    /// Checkout with an explicit clock reading for the expiry check.
    #[tracing::instrument(
        name = "checkout",
        skip_all,
        fields(customer = %customer_id, lines = cart.len())
    )]
    pub fn checkout_at(
        &self,
        catalog: &Catalog,
        accounts: &CustomerAccounts,
        customer_id: CustomerId,
        cart: &Cart,
        now: DateTime<Utc>,
    ) -> DomainResult<Receipt> {
        if cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let (pricing, balance_after) = {
            let mut products =
                catalog.lock_many(cart.lines().iter().map(|line| line.product_id))?;
            let mut customer = accounts.lock(customer_id)?;

            validate_lines(cart, &products, now)?;

            let pricing = self.price(cart, &products)?;

            if !customer.can_afford(pricing.total) {
                return Err(DomainError::InsufficientBalance);
            }

            commit(cart, &mut products, &mut customer, pricing.total)?;
            (pricing, customer.balance())
        };

        tracing::info!(
            subtotal = %pricing.subtotal,
            shipping_fee = %pricing.shipping_fee,
            total = %pricing.total,
            "checkout committed"
        );

        let shipment = self.shipping.manifest(&pricing.units)?;
        if !shipment.is_empty() {
            tracing::debug!(manifest = %shipment, "shipment manifest");
        }

        Ok(Receipt {
            customer_id,
            lines: cart
                .lines()
                .iter()
                .zip(pricing.line_totals)
                .map(|(line, line_total)| ReceiptLine {
                    quantity: line.quantity,
                    name: line.name.clone(),
                    line_total,
                })
                .collect(),
            subtotal: pricing.subtotal,
            shipping_fee: pricing.shipping_fee,
            total: pricing.total,
            balance_after,
            shipment,
        })
    }

    fn price(&self, cart: &Cart, products: &ProductLocks<'_>) -> DomainResult<Pricing> {
        let line_totals = cart
            .lines()
            .iter()
            .map(CartLine::line_total)
            .collect::<DomainResult<Vec<_>>>()?;
        let subtotal = cart.subtotal()?;

        let mut units = Vec::new();
        for line in cart.lines() {
            let product = products.get(line.product_id)?;
            if let Some(weight) = product.shipping_weight() {
                // Checked here so the manifest cannot fail once committed.
                weight
                    .grams()
                    .ok_or_else(|| DomainError::invariant("unit weight overflow"))?;
                let label: Arc<str> = Arc::from(product.name());
                units.extend(
                    (0..line.quantity).map(|_| ShippableUnit::new(Arc::clone(&label), weight)),
                );
            }
        }

        let shipping_fee = self.shipping.calculate_fee(&units)?;
        let total = subtotal
            .checked_add(shipping_fee)
            .ok_or_else(|| DomainError::invariant("checkout total overflow"))?;
        Ok(Pricing {
            line_totals,
            subtotal,
            shipping_fee,
            total,
            units,
        })
    }
}

fn validate_lines(cart: &Cart, products: &ProductLocks<'_>, now: DateTime<Utc>) -> DomainResult<()> {
    for line in cart.lines() {
        let product = products.get(line.product_id)?;
        if product.is_expired_at(now) {
            return Err(DomainError::ProductExpired(product.name().to_string()));
        }
        if product.stock() < line.quantity {
            return Err(DomainError::InsufficientStock(product.name().to_string()));
        }
    }
    Ok(())
}

/// Apply the debit and the stock reductions.
///
/// Every check has already passed under the same locks, so a failure here
/// means the records are inconsistent; the invocation is aborted with an
/// invariant violation and no rollback is attempted.
fn commit(
    cart: &Cart,
    products: &mut ProductLocks<'_>,
    customer: &mut Customer,
    total: Money,
) -> DomainResult<()> {
    customer.deduct_balance(total).map_err(commit_fault)?;
    for line in cart.lines() {
        products
            .get_mut(line.product_id)?
            .reduce_stock(line.quantity)
            .map_err(commit_fault)?;
    }
    Ok(())
}

fn commit_fault(err: DomainError) -> DomainError {
    tracing::error!(error = %err, "checkout commit failed after validation");
    DomainError::invariant(format!("commit failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;
    use shopfront_core::{ProductId, Weight};
    use shopfront_parties::RegisterCustomer;
    use shopfront_products::{CreateProduct, ShippingProfile};

    struct Shop {
        catalog: Catalog,
        accounts: CustomerAccounts,
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn shop() -> Shop {
        Shop {
            catalog: Catalog::new(),
            accounts: CustomerAccounts::new(),
        }
    }

    impl Shop {
        fn product(
            &mut self,
            name: &str,
            price: u64,
            stock: u32,
            weight_grams: Option<i64>,
            expires_on: Option<NaiveDate>,
        ) -> ProductId {
            let shipping = match weight_grams {
                Some(g) => ShippingProfile::Shipped {
                    weight: Weight::kilograms(Decimal::new(g, 3)).unwrap(),
                },
                None => ShippingProfile::NotShipped,
            };
            self.catalog
                .create(CreateProduct {
                    product_id: ProductId::new(),
                    name: name.to_string(),
                    unit_price: Money::whole(price),
                    stock,
                    shipping,
                    expires_on,
                })
                .unwrap()
        }

        fn customer(&mut self, balance: u64) -> CustomerId {
            self.accounts
                .register(RegisterCustomer {
                    customer_id: CustomerId::new(),
                    name: "Test Customer".to_string(),
                    opening_balance: Money::whole(balance),
                })
                .unwrap()
        }

        fn checkout(&self, customer: CustomerId, cart: &Cart) -> DomainResult<Receipt> {
            CheckoutService::default().checkout_at(&self.catalog, &self.accounts, customer, cart, now())
        }

        fn stock(&self, id: ProductId) -> u32 {
            self.catalog.get(id).unwrap().stock()
        }

        fn balance(&self, id: CustomerId) -> Money {
            self.accounts.get(id).unwrap().balance()
        }
    }

    #[test]
    fn empty_cart_is_rejected_without_side_effects() {
        let mut shop = shop();
        let customer = shop.customer(100);

        let err = shop.checkout(customer, &Cart::new()).unwrap_err();
        assert_eq!(err, DomainError::EmptyCart);
        assert_eq!(shop.balance(customer), Money::whole(100));
    }

    #[test]
    fn expired_line_blocks_whole_checkout() {
        let mut shop = shop();
        let fresh = shop.product("Bread", 10, 5, None, None);
        let stale = shop.product(
            "Milk",
            5,
            5,
            Some(1000),
            NaiveDate::from_ymd_opt(2026, 5, 31),
        );
        let customer = shop.customer(1000);

        let mut cart = Cart::new();
        cart.add(&shop.catalog, fresh, 2).unwrap();
        cart.add(&shop.catalog, stale, 1).unwrap();

        let err = shop.checkout(customer, &cart).unwrap_err();
        assert_eq!(err, DomainError::ProductExpired("Milk".to_string()));
        assert_eq!(shop.stock(fresh), 5);
        assert_eq!(shop.stock(stale), 5);
        assert_eq!(shop.balance(customer), Money::whole(1000));
    }

    #[test]
    fn product_expiring_today_is_still_sellable() {
        let mut shop = shop();
        let milk = shop.product("Milk", 5, 5, None, NaiveDate::from_ymd_opt(2026, 6, 1));
        let customer = shop.customer(100);

        let mut cart = Cart::new();
        cart.add(&shop.catalog, milk, 1).unwrap();

        let receipt = shop.checkout(customer, &cart).unwrap();
        assert_eq!(receipt.total, Money::whole(5));
    }

    #[test]
    fn stock_drained_after_add_is_caught_at_checkout() {
        let mut shop = shop();
        let tv = shop.product("TV", 150, 3, Some(700), None);
        let customer = shop.customer(10_000);

        let mut cart = Cart::new();
        cart.add(&shop.catalog, tv, 3).unwrap();
        shop.catalog.lock(tv).unwrap().reduce_stock(1).unwrap();

        let err = shop.checkout(customer, &cart).unwrap_err();
        assert_eq!(err, DomainError::InsufficientStock("TV".to_string()));
        assert_eq!(shop.stock(tv), 2);
        assert_eq!(shop.balance(customer), Money::whole(10_000));
    }

    #[test]
    fn shipping_expands_per_unit() {
        let mut shop = shop();
        let cheese = shop.product("Cheese", 100, 10, Some(200), None);
        let customer = shop.customer(1000);

        let mut cart = Cart::new();
        cart.add(&shop.catalog, cheese, 3).unwrap();

        let receipt = shop.checkout(customer, &cart).unwrap();
        assert_eq!(receipt.shipment.entries.len(), 3);
        // 0.6kg * 30 = 18
        assert_eq!(receipt.shipping_fee, Money::whole(18));
        assert_eq!(receipt.total, Money::whole(318));
    }

    #[test]
    fn exact_balance_is_affordable() {
        let mut shop = shop();
        let card = shop.product("Scratch Card", 50, 2, None, None);
        let customer = shop.customer(100);

        let mut cart = Cart::new();
        cart.add(&shop.catalog, card, 2).unwrap();

        let receipt = shop.checkout(customer, &cart).unwrap();
        assert!(receipt.balance_after.is_zero());
        assert_eq!(shop.stock(card), 0);
    }

    #[test]
    fn unknown_customer_is_not_found() {
        let mut shop = shop();
        let card = shop.product("Scratch Card", 50, 2, None, None);
        let mut cart = Cart::new();
        cart.add(&shop.catalog, card, 1).unwrap();

        let err = shop.checkout(CustomerId::new(), &cart).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(shop.stock(card), 2);
    }

    #[test]
    fn overflowing_total_is_rejected_and_product_stays_usable() {
        let mut shop = shop();
        let gold = shop
            .catalog
            .create(CreateProduct {
                product_id: ProductId::new(),
                name: "Gold".to_string(),
                unit_price: Money::new(Decimal::MAX).unwrap(),
                stock: 5,
                shipping: ShippingProfile::NotShipped,
                expires_on: None,
            })
            .unwrap();
        let customer = shop.customer(1000);

        let mut cart = Cart::new();
        cart.add(&shop.catalog, gold, 2).unwrap();

        let err = shop.checkout(customer, &cart).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(shop.stock(gold), 5);
        assert_eq!(shop.balance(customer), Money::whole(1000));

        cart.add(&shop.catalog, gold, 1).unwrap();
        assert_eq!(cart.quantity_of(gold), Some(3));
        assert!(shop.catalog.lock(gold).is_ok());
    }

    #[test]
    fn overflowing_shipping_fee_is_rejected() {
        let mut shop = shop();
        let anvil = shop
            .catalog
            .create(CreateProduct {
                product_id: ProductId::new(),
                name: "Anvil".to_string(),
                unit_price: Money::whole(1),
                stock: 5,
                shipping: ShippingProfile::Shipped {
                    weight: Weight::kilograms(Decimal::MAX).unwrap(),
                },
                expires_on: None,
            })
            .unwrap();
        let customer = shop.customer(1000);

        let mut cart = Cart::new();
        cart.add(&shop.catalog, anvil, 1).unwrap();

        let err = shop.checkout(customer, &cart).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(shop.stock(anvil), 5);
        assert_eq!(shop.balance(customer), Money::whole(1000));
    }

    #[test]
    fn shipped_units_of_a_line_share_one_label() {
        let mut shop = shop();
        let cheese = shop.product("Cheese", 100, 10, Some(200), None);
        let mut cart = Cart::new();
        cart.add(&shop.catalog, cheese, 3).unwrap();

        let products = shop.catalog.lock_many([cheese]).unwrap();
        let pricing = CheckoutService::default().price(&cart, &products).unwrap();

        assert_eq!(pricing.units.len(), 3);
        assert!(Arc::ptr_eq(&pricing.units[0].label, &pricing.units[2].label));
        assert_eq!(pricing.line_totals, vec![Money::whole(300)]);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        struct LineSpec {
            price: u64,
            stock: u32,
            quantity: u32,
            drained: u32,
            weight_grams: Option<i64>,
            expires_in_days: Option<i64>,
        }

        /// A line that fits the stock when added; some stock may be drained
        /// afterwards.
        fn line_spec() -> impl Strategy<Value = LineSpec> {
            (
                0u64..500,
                1u32..20,
                any::<u32>(),
                any::<u32>(),
                prop::option::of(0i64..5_000),
                prop::option::of(-3i64..3),
            )
                .prop_map(|(price, stock, q, d, weight_grams, expires_in_days)| LineSpec {
                    price,
                    stock,
                    quantity: 1 + q % stock,
                    drained: d % (stock + 1),
                    weight_grams,
                    expires_in_days,
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: a rejected checkout changes no stock and no balance;
            /// an accepted one takes exactly the cart quantities and the total.
            #[test]
            fn failed_checkout_leaves_state_unchanged(
                specs in prop::collection::vec(line_spec(), 1..4),
                balance in 0u64..5_000
            ) {
                let mut shop = shop();
                let today = now().date_naive();
                let mut cart = Cart::new();
                let mut ids = Vec::new();
                for spec in &specs {
                    let expires_on = spec
                        .expires_in_days
                        .and_then(|d| today.checked_add_signed(chrono::Duration::days(d)));
                    let id = shop.product("Item", spec.price, spec.stock, spec.weight_grams, expires_on);
                    cart.add(&shop.catalog, id, spec.quantity).unwrap();
                    if spec.drained > 0 {
                        shop.catalog.lock(id).unwrap().reduce_stock(spec.drained).unwrap();
                    }
                    ids.push(id);
                }
                let customer = shop.customer(balance);
                let stocks_before: Vec<u32> = ids.iter().map(|id| shop.stock(*id)).collect();

                match shop.checkout(customer, &cart) {
                    Err(_) => {
                        let stocks_after: Vec<u32> = ids.iter().map(|id| shop.stock(*id)).collect();
                        prop_assert_eq!(stocks_after, stocks_before);
                        prop_assert_eq!(shop.balance(customer), Money::whole(balance));
                    }
                    Ok(receipt) => {
                        for ((id, spec), before) in ids.iter().zip(&specs).zip(&stocks_before) {
                            prop_assert_eq!(shop.stock(*id), before - spec.quantity);
                        }
                        prop_assert_eq!(
                            Some(receipt.balance_after),
                            Money::whole(balance).checked_sub(receipt.total)
                        );
                        prop_assert_eq!(shop.balance(customer), receipt.balance_after);
                    }
                }
            }
        }
    }
}

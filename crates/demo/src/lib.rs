//! Demo wiring: a sample shop, a handful of checkouts, console receipts.

pub mod config;

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use shopfront_core::{CustomerId, DomainResult, Money, ProductId, Weight};
use shopfront_inventory::Catalog;
use shopfront_parties::{CustomerAccounts, RegisterCustomer};
use shopfront_products::{CreateProduct, ShippingProfile};
use shopfront_sales::{Cart, CheckoutService, Receipt};

pub use config::AppConfig;

/// Sample catalog and customers.
pub struct SampleShop {
    pub catalog: Catalog,
    pub accounts: CustomerAccounts,
    pub cheese: ProductId,
    pub biscuits: ProductId,
    pub tv: ProductId,
    pub scratch_card: ProductId,
}

fn kg(mantissa: i64, scale: u32) -> DomainResult<Weight> {
    Weight::kilograms(Decimal::new(mantissa, scale))
}

impl SampleShop {
    pub fn load(today: NaiveDate) -> DomainResult<Self> {
        let mut catalog = Catalog::new();
        let next_week = today.checked_add_days(Days::new(7)).unwrap_or(today);
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);

        let cheese = catalog.create(CreateProduct {
            product_id: ProductId::new(),
            name: "Cheese".to_string(),
            unit_price: Money::whole(100),
            stock: 10,
            shipping: ShippingProfile::Shipped { weight: kg(2, 1)? },
            expires_on: Some(next_week),
        })?;
        let biscuits = catalog.create(CreateProduct {
            product_id: ProductId::new(),
            name: "Biscuits".to_string(),
            unit_price: Money::whole(150),
            stock: 5,
            shipping: ShippingProfile::Shipped { weight: kg(7, 1)? },
            expires_on: Some(yesterday),
        })?;
        let tv = catalog.create(CreateProduct {
            product_id: ProductId::new(),
            name: "TV".to_string(),
            unit_price: Money::whole(150),
            stock: 15,
            shipping: ShippingProfile::Shipped { weight: kg(7, 1)? },
            expires_on: None,
        })?;
        let scratch_card = catalog.create(CreateProduct {
            product_id: ProductId::new(),
            name: "Mobile Scratch Card".to_string(),
            unit_price: Money::whole(50),
            stock: 20,
            shipping: ShippingProfile::NotShipped,
            expires_on: None,
        })?;

        Ok(Self {
            catalog,
            accounts: CustomerAccounts::new(),
            cheese,
            biscuits,
            tv,
            scratch_card,
        })
    }

    pub fn register(&mut self, name: &str, balance: u64) -> DomainResult<CustomerId> {
        self.accounts.register(RegisterCustomer {
            customer_id: CustomerId::new(),
            name: name.to_string(),
            opening_balance: Money::whole(balance),
        })
    }
}

/// One named checkout attempt and how it ended.
pub struct Scenario {
    pub title: &'static str,
    pub outcome: DomainResult<Receipt>,
}

/// Run the demo checkouts in order against a fresh sample shop.
pub fn run(config: AppConfig) -> anyhow::Result<Vec<Scenario>> {
    let mut shop = SampleShop::load(Utc::now().date_naive())?;
    let service = CheckoutService::new(shopfront_sales::ShippingCalculator::new(config.shipping));
    let mut scenarios = Vec::new();

    let alice = shop.register("Alice", 1000)?;
    let outcome = build_cart(&shop, &[(shop.cheese, 2), (shop.tv, 1), (shop.scratch_card, 1)])
        .and_then(|cart| service.checkout(&shop.catalog, &shop.accounts, alice, &cart));
    scenarios.push(Scenario {
        title: "mixed cart",
        outcome,
    });

    let bob = shop.register("Bob", 300)?;
    let outcome = build_cart(&shop, &[(shop.cheese, 2), (shop.tv, 1)])
        .and_then(|cart| service.checkout(&shop.catalog, &shop.accounts, bob, &cart));
    scenarios.push(Scenario {
        title: "insufficient balance",
        outcome,
    });

    let carol = shop.register("Carol", 5000)?;
    let outcome = build_cart(&shop, &[(shop.biscuits, 1)])
        .and_then(|cart| service.checkout(&shop.catalog, &shop.accounts, carol, &cart));
    scenarios.push(Scenario {
        title: "expired product",
        outcome,
    });

    let outcome = build_cart(&shop, &[(shop.tv, 16)])
        .and_then(|cart| service.checkout(&shop.catalog, &shop.accounts, carol, &cart));
    scenarios.push(Scenario {
        title: "more than in stock",
        outcome,
    });

    let outcome = service.checkout(&shop.catalog, &shop.accounts, carol, &Cart::new());
    scenarios.push(Scenario {
        title: "empty cart",
        outcome,
    });

    Ok(scenarios)
}

fn build_cart(shop: &SampleShop, items: &[(ProductId, u32)]) -> DomainResult<Cart> {
    let mut cart = Cart::new();
    for (product_id, quantity) in items {
        cart.add(&shop.catalog, *product_id, *quantity)?;
    }
    Ok(cart)
}

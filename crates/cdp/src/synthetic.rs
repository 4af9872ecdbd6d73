//! Synthetic ERP data — realistic order history for demos and load runs.
//!
//! History is anchored to the evaluation instant of each fetch, so order ages
//! stay stable however long the process runs. Reproducible when seeded: the
//! same seed and instant always yield the same orders and directory.

use crate::source::{OrderSource, SourceBatch};
use anyhow::{Context, Result};
use async_trait::async_trait;
use campaign_core::types::{CustomerRecord, LineItem, Order, OrderStatus};
use chrono::{DateTime, Datelike, Duration, Utc};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

struct Product {
    sku: &'static str,
    name: &'static str,
    price: Decimal,
}

const CATALOG: [Product; 8] = [
    Product { sku: "LAPTOP-PRO-15", name: "ProBook Laptop 15\"", price: dec!(1299.99) },
    Product { sku: "DESK-CHAIR-ERG", name: "ErgoMax Office Chair", price: dec!(449.99) },
    Product { sku: "MONITOR-4K-27", name: "UltraView 4K Monitor 27\"", price: dec!(599.99) },
    Product { sku: "KEYBOARD-MECH", name: "MechMaster Keyboard RGB", price: dec!(149.99) },
    Product { sku: "MOUSE-WIRELESS", name: "PrecisionGlide Mouse", price: dec!(79.99) },
    Product { sku: "HEADSET-NC", name: "QuietZone Noise-Cancel Headset", price: dec!(299.99) },
    Product { sku: "WEBCAM-HD", name: "ClearView HD Webcam", price: dec!(129.99) },
    Product { sku: "DOCK-STATION", name: "HyperConnect Docking Station", price: dec!(249.99) },
];

const ORDERS_PER_CUSTOMER: [(u32, u32); 8] =
    [(1, 15), (2, 20), (3, 25), (4, 20), (5, 10), (6, 5), (8, 3), (10, 2)];
const ITEMS_PER_ORDER: [(usize, u32); 4] = [(1, 40), (2, 35), (3, 20), (4, 5)];
const STATUSES: [(OrderStatus, u32); 3] = [
    (OrderStatus::Completed, 85),
    (OrderStatus::Pending, 10),
    (OrderStatus::Cancelled, 5),
];

const DOMAINS: [&str; 5] = [
    "techcorp.com",
    "businessltd.co.uk",
    "enterprise.de",
    "solutions.fr",
    "global.jp",
];
const LANGUAGES: [&str; 5] = ["en", "de", "fr", "es", "ja"];
const INDUSTRIES: [&str; 5] = ["Technology", "Manufacturing", "Retail", "Healthcare", "Finance"];
const COMPANY_SIZES: [&str; 3] = ["SMB", "Mid-Market", "Enterprise"];

/// Days of history generated before the evaluation instant.
const HISTORY_DAYS: i64 = 365;

pub struct SyntheticOrderSource {
    seed: Option<u64>,
}

impl SyntheticOrderSource {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// `as_of` is the newest possible order date; history reaches back a year.
    fn generate(&self, customer_count: u32, as_of: DateTime<Utc>) -> Result<SourceBatch> {
        let mut rng = self.rng();
        let order_counts = weighted(&ORDERS_PER_CUSTOMER)?;
        let item_counts = weighted(&ITEMS_PER_ORDER)?;
        let statuses = weighted(&STATUSES)?;
        let base_date = as_of - Duration::days(HISTORY_DAYS);

        let mut batch = SourceBatch::default();

        for i in 0..customer_count {
            let customer_id = format!("CUST-{:05}", i);
            let num_orders = ORDERS_PER_CUSTOMER[order_counts.sample(&mut rng)].0;

            for n in 0..num_orders {
                let order_date = base_date + Duration::days(rng.gen_range(0..=HISTORY_DAYS));
                let num_items = ITEMS_PER_ORDER[item_counts.sample(&mut rng)].0;

                let items: Vec<LineItem> = CATALOG
                    .choose_multiple(&mut rng, num_items)
                    .map(|p| LineItem {
                        sku: p.sku.to_string(),
                        name: p.name.to_string(),
                        quantity: rng.gen_range(1..=3),
                        unit_price: p.price,
                    })
                    .collect();
                let total_amount = items.iter().map(LineItem::line_total).sum();

                batch.orders.push(Order {
                    order_id: format!("ORD-{}{:04}{:03}", order_date.year(), i, n),
                    customer_id: customer_id.clone(),
                    customer_name: format!("Customer {} Corp", i + 1),
                    order_date,
                    total_amount,
                    items,
                    status: STATUSES[statuses.sample(&mut rng)].0,
                });
            }

            batch.directory.insert(CustomerRecord {
                customer_id,
                email: format!("customer{}@{}", i + 1, pick(&mut rng, &DOMAINS)),
                language: pick(&mut rng, &LANGUAGES).to_string(),
                industry: Some(pick(&mut rng, &INDUSTRIES).to_string()),
                company_size: Some(pick(&mut rng, &COMPANY_SIZES).to_string()),
            });
        }

        Ok(batch)
    }
}

#[async_trait]
impl OrderSource for SyntheticOrderSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch(&self, customer_count: u32, as_of: DateTime<Utc>) -> Result<SourceBatch> {
        let batch = self.generate(customer_count, as_of)?;
        info!(
            total_orders = batch.orders.len(),
            unique_customers = customer_count,
            seeded = self.seed.is_some(),
            "Generated synthetic ERP orders"
        );
        Ok(batch)
    }
}

fn weighted<T>(table: &[(T, u32)]) -> Result<WeightedIndex<u32>> {
    WeightedIndex::new(table.iter().map(|(_, w)| *w)).context("invalid weight table")
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

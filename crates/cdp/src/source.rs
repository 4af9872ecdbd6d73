//! Order source abstraction — where the pipeline gets its ERP orders and
//! customer master data from.

use anyhow::{Context, Result};
use async_trait::async_trait;
use campaign_core::types::{CustomerDirectory, CustomerRecord, Order};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Orders plus the customer directory they refer to.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub orders: Vec<Order>,
    pub directory: CustomerDirectory,
}

#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch orders for up to `customer_count` customers as of `as_of`,
    /// the instant the batch is evaluated at.
    async fn fetch(&self, customer_count: u32, as_of: DateTime<Utc>) -> Result<SourceBatch>;
}

/// On-disk / in-memory export format: `{ "orders": [...], "customers": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderExport {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub customers: Vec<CustomerRecord>,
}

/// Fixed data set. `customer_count` and `as_of` are ignored; the whole set
/// is returned with its recorded dates.
#[derive(Debug, Clone, Default)]
pub struct StaticOrderSource {
    orders: Vec<Order>,
    customers: Vec<CustomerRecord>,
}

impl StaticOrderSource {
    pub fn new(orders: Vec<Order>, customers: Vec<CustomerRecord>) -> Self {
        Self { orders, customers }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let export: OrderExport =
            serde_json::from_str(json).context("failed to parse order export")?;
        Ok(Self::new(export.orders, export.customers))
    }
}

#[async_trait]
impl OrderSource for StaticOrderSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, customer_count: u32, _as_of: DateTime<Utc>) -> Result<SourceBatch> {
        info!(
            orders = self.orders.len(),
            customers = self.customers.len(),
            requested = customer_count,
            "Serving fixed order export"
        );
        Ok(SourceBatch {
            orders: self.orders.clone(),
            directory: self.customers.iter().cloned().collect(),
        })
    }
}

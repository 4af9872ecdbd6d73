//! Customer metrics — recency, frequency and average value per customer,
//! restricted to high-value customers.

use crate::aggregator::{CustomerAggregate, OrderAggregator};
use campaign_core::error::CampaignError;
use campaign_core::types::{
    CustomerDirectory, CustomerMetrics, Order, DEFAULT_LANGUAGE, PLACEHOLDER_EMAIL,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const DEFAULT_HIGH_VALUE_THRESHOLD: Decimal = dec!(10000);

/// Days in the window `purchase_frequency` is expressed in.
const FREQUENCY_WINDOW_DAYS: Decimal = dec!(30);
const SECONDS_PER_DAY: i64 = 86_400;

pub struct CustomerMetricsCalculator {
    high_value_threshold: Decimal,
}

impl CustomerMetricsCalculator {
    pub fn new(high_value_threshold: Decimal) -> Self {
        Self {
            high_value_threshold,
        }
    }

    /// Metrics for a single aggregate, or `None` when the customer is below
    /// the high-value threshold.
    pub fn metrics_for(
        &self,
        aggregate: &CustomerAggregate,
        directory: &CustomerDirectory,
        evaluated_at: DateTime<Utc>,
    ) -> Option<CustomerMetrics> {
        if aggregate.completed_orders == 0 || aggregate.total_spend < self.high_value_threshold {
            debug!(
                customer_id = %aggregate.customer_id,
                total_spend = %aggregate.total_spend,
                "Customer below high-value threshold, excluded"
            );
            return None;
        }

        let last_order = aggregate.last_order()?;
        let order_count = aggregate.completed_orders;

        let (email, language) = match directory.get(&aggregate.customer_id) {
            Some(record) => (record.email.clone(), record.language.clone()),
            None => {
                let gap = CampaignError::DataGap(aggregate.customer_id.clone());
                warn!(
                    customer_id = %aggregate.customer_id,
                    placeholder = PLACEHOLDER_EMAIL,
                    recoverable = gap.is_recoverable(),
                    error = %gap,
                    "Using placeholder contact details"
                );
                (PLACEHOLDER_EMAIL.to_string(), DEFAULT_LANGUAGE.to_string())
            }
        };

        let frequency = purchase_frequency(order_count, aggregate.date_range_days());

        Some(CustomerMetrics {
            customer_id: aggregate.customer_id.clone(),
            customer_name: last_order.customer_name.clone(),
            email,
            language,
            total_spend: aggregate.total_spend,
            order_count,
            avg_order_value: aggregate.total_spend / Decimal::from(order_count),
            last_purchase_date: last_order.order_date,
            days_since_purchase: whole_days_between(last_order.order_date, evaluated_at),
            purchase_frequency: frequency,
        })
    }

    /// Metrics for every high-value customer, in ascending customer-id order.
    pub fn compute(
        &self,
        aggregates: &BTreeMap<String, CustomerAggregate>,
        directory: &CustomerDirectory,
        evaluated_at: DateTime<Utc>,
    ) -> Vec<CustomerMetrics> {
        let metrics: Vec<CustomerMetrics> = aggregates
            .values()
            .filter_map(|a| self.metrics_for(a, directory, evaluated_at))
            .collect();

        info!(
            high_value_customers = metrics.len(),
            total_customers = aggregates.len(),
            threshold = %self.high_value_threshold,
            "Customer metrics computed"
        );

        metrics
    }

    /// Aggregate `orders` and compute metrics in one pass.
    pub fn compute_from_orders(
        &self,
        orders: &[Order],
        directory: &CustomerDirectory,
        evaluated_at: DateTime<Utc>,
    ) -> Vec<CustomerMetrics> {
        let aggregates = OrderAggregator::aggregate(orders);
        self.compute(&aggregates, directory, evaluated_at)
    }
}

impl Default for CustomerMetricsCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_VALUE_THRESHOLD)
    }
}

/// Orders per 30 days, rounded half-even to two places.
fn purchase_frequency(order_count: u32, range_days: i64) -> f64 {
    let days = Decimal::from(range_days.max(1));
    (Decimal::from(order_count) * FREQUENCY_WINDOW_DAYS / days)
        .round_dp(2)
        .to_f64()
        .unwrap_or_default()
}

/// Floored whole days from `from` to `to`; negative when `from` is later.
fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

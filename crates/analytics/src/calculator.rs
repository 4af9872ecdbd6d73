//! Campaign analytics — segment tallies and ROI estimate over a finished batch.

use campaign_core::config::AnalyticsConfig;
use campaign_core::types::{AnalyticsReport, CampaignOutcome, CustomerMetrics};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

pub const DEFAULT_CONVERSION_RATE: Decimal = dec!(0.15);
pub const DEFAULT_COST_PER_SEND: Decimal = dec!(0.50);

pub struct AnalyticsCalculator {
    conversion_rate: Decimal,
    cost_per_send: Decimal,
}

impl AnalyticsCalculator {
    pub fn new(conversion_rate: Decimal, cost_per_send: Decimal) -> Self {
        Self {
            conversion_rate,
            cost_per_send,
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.conversion_rate, config.cost_per_send)
    }

    /// Summarize `outcomes`. Revenue is estimated over every customer in
    /// `customers`, cost over the outcomes actually produced.
    pub fn calculate(
        &self,
        outcomes: &[CampaignOutcome],
        customers: &[CustomerMetrics],
    ) -> AnalyticsReport {
        let mut segments: BTreeMap<String, u32> = BTreeMap::new();
        for outcome in outcomes {
            *segments.entry(outcome.segment.as_str().to_string()).or_default() += 1;
        }

        let high_value_count = outcomes
            .iter()
            .filter(|o| o.segment.is_high_value())
            .count() as u32;

        let emails_sent = outcomes.iter().filter(|o| o.delivered).count() as u32;

        let revenue = self.estimated_revenue(customers);
        let cost = self.campaign_cost(outcomes.len());

        AnalyticsReport {
            total_processed: outcomes.len() as u32,
            segments,
            emails_sent,
            high_value_count,
            estimated_roi: format_roi(roi_percent(revenue, cost)),
        }
    }

    pub fn estimated_revenue(&self, customers: &[CustomerMetrics]) -> Decimal {
        let total_value: Decimal = customers.iter().map(|c| c.avg_order_value).sum();
        total_value * self.conversion_rate
    }

    pub fn campaign_cost(&self, sends: usize) -> Decimal {
        Decimal::from(sends) * self.cost_per_send
    }
}

impl Default for AnalyticsCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSION_RATE, DEFAULT_COST_PER_SEND)
    }
}

/// `(revenue − cost) / cost × 100`, or `None` when nothing was spent.
pub fn roi_percent(revenue: Decimal, cost: Decimal) -> Option<Decimal> {
    if cost.is_zero() {
        return None;
    }
    revenue
        .checked_sub(cost)
        .and_then(|net| net.checked_div(cost))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
}

/// One decimal place, half-even, with a trailing percent sign.
pub fn format_roi(roi: Option<Decimal>) -> String {
    match roi {
        Some(value) => {
            let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven);
            format!("{:.1}%", rounded)
        }
        None => "0%".to_string(),
    }
}

/// Share of delivered outcomes, formatted like the ROI figure.
pub fn delivery_success_rate(outcomes: &[CampaignOutcome]) -> String {
    if outcomes.is_empty() {
        return "0%".to_string();
    }
    let delivered = outcomes.iter().filter(|o| o.delivered).count();
    let rate = Decimal::from(delivered) / Decimal::from(outcomes.len()) * dec!(100);
    format_roi(Some(rate))
}

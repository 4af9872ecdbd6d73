//! Rule predicates and thresholds shared by the segmentation and routing tables.

use campaign_core::types::{CampaignPath, CustomerMetrics, Segment};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const VIP_MIN_SPEND: Decimal = dec!(50000);
pub const VIP_MAX_DAYS_SINCE: i64 = 60;
pub const GROWTH_MIN_SPEND: Decimal = dec!(15000);
pub const GROWTH_MIN_FREQUENCY: f64 = 1.0;
pub const CHURNED_MIN_DAYS_SINCE: i64 = 90;
pub const AT_RISK_MIN_DAYS_SINCE: i64 = 60;
pub const NEW_MAX_ORDERS: u32 = 2;
pub const WINBACK_MIN_DAYS_SINCE: i64 = 30;

/// One row of the segmentation table.
#[derive(Clone, Copy)]
pub struct SegmentRule {
    pub name: &'static str,
    pub predicate: fn(&CustomerMetrics) -> bool,
    pub segment: Segment,
    pub reasoning: &'static str,
}

impl SegmentRule {
    pub fn matches(&self, metrics: &CustomerMetrics) -> bool {
        (self.predicate)(metrics)
    }
}

/// One row of the routing table.
#[derive(Clone, Copy)]
pub struct RouteRule {
    pub name: &'static str,
    pub predicate: fn(Segment, &CustomerMetrics) -> bool,
    pub path: CampaignPath,
}

impl RouteRule {
    pub fn matches(&self, segment: Segment, metrics: &CustomerMetrics) -> bool {
        (self.predicate)(segment, metrics)
    }
}

impl std::fmt::Debug for SegmentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentRule")
            .field("name", &self.name)
            .field("segment", &self.segment)
            .finish()
    }
}

impl std::fmt::Debug for RouteRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRule")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

pub fn is_vip(m: &CustomerMetrics) -> bool {
    m.total_spend >= VIP_MIN_SPEND && m.days_since_purchase < VIP_MAX_DAYS_SINCE
}

pub fn is_growth(m: &CustomerMetrics) -> bool {
    m.total_spend >= GROWTH_MIN_SPEND && m.purchase_frequency > GROWTH_MIN_FREQUENCY
}

pub fn is_churned(m: &CustomerMetrics) -> bool {
    m.days_since_purchase >= CHURNED_MIN_DAYS_SINCE
}

/// Only meaningful after `is_churned` has been ruled out.
pub fn is_at_risk(m: &CustomerMetrics) -> bool {
    m.days_since_purchase >= AT_RISK_MIN_DAYS_SINCE
}

pub fn is_new(m: &CustomerMetrics) -> bool {
    m.order_count <= NEW_MAX_ORDERS
}

pub fn always(_: &CustomerMetrics) -> bool {
    true
}

pub fn is_lapsing_growth(segment: Segment, m: &CustomerMetrics) -> bool {
    segment == Segment::Growth && m.days_since_purchase > WINBACK_MIN_DAYS_SINCE
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Metrics fixture; callers override the fields a rule looks at.
    pub fn metrics(spend: Decimal, orders: u32, days_since: i64, frequency: f64) -> CustomerMetrics {
        CustomerMetrics {
            customer_id: "CUST-00042".into(),
            customer_name: "Customer 43 Corp".into(),
            email: "customer43@solutions.fr".into(),
            language: "fr".into(),
            total_spend: spend,
            order_count: orders,
            avg_order_value: spend / Decimal::from(orders.max(1)),
            last_purchase_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            days_since_purchase: days_since,
            purchase_frequency: frequency,
        }
    }
}

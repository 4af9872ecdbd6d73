//! Lifecycle segmentation engine — first-match evaluation of an ordered rule table.

use campaign_core::types::{CustomerMetrics, Segment, SegmentAssignment};
use tracing::debug;

use crate::predicates::{self, SegmentRule};

/// Confidence attached to every assignment. Not computed per customer.
pub const SEGMENT_CONFIDENCE: f64 = 0.92;

const FALLBACK_REASONING: &str = "Standard customer - regular engagement appropriate";

/// The lifecycle rules in evaluation order. Earlier rows win.
pub fn default_rules() -> Vec<SegmentRule> {
    vec![
        SegmentRule {
            name: "vip",
            predicate: predicates::is_vip,
            segment: Segment::Vip,
            reasoning: "High spend (>$50K) with recent activity - premium customer",
        },
        SegmentRule {
            name: "growth",
            predicate: predicates::is_growth,
            segment: Segment::Growth,
            reasoning: "Strong mid-tier customer with increasing purchase frequency",
        },
        SegmentRule {
            name: "churned",
            predicate: predicates::is_churned,
            segment: Segment::Churned,
            reasoning: "Inactive for 90+ days - requires win-back campaign",
        },
        SegmentRule {
            name: "at_risk",
            predicate: predicates::is_at_risk,
            segment: Segment::AtRisk,
            reasoning: "60-90 days inactive - re-engagement needed",
        },
        SegmentRule {
            name: "new",
            predicate: predicates::is_new,
            segment: Segment::New,
            reasoning: "New customer - focus on onboarding and education",
        },
        SegmentRule {
            name: "default",
            predicate: predicates::always,
            segment: Segment::Default,
            reasoning: FALLBACK_REASONING,
        },
    ]
}

pub struct SegmentationEngine {
    rules: Vec<SegmentRule>,
}

impl SegmentationEngine {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Build an engine over a custom table. A table without a catch-all row
    /// still resolves every customer, to `Segment::Default`.
    pub fn with_rules(rules: Vec<SegmentRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SegmentRule] {
        &self.rules
    }

    /// The first rule whose predicate holds for `metrics`.
    pub fn matching_rule(&self, metrics: &CustomerMetrics) -> Option<&SegmentRule> {
        self.rules.iter().find(|rule| rule.matches(metrics))
    }

    pub fn evaluate(&self, metrics: &CustomerMetrics) -> SegmentAssignment {
        let (rule_name, segment, reasoning) = match self.matching_rule(metrics) {
            Some(rule) => (rule.name, rule.segment, rule.reasoning),
            None => ("fallback", Segment::Default, FALLBACK_REASONING),
        };

        debug!(
            customer_id = %metrics.customer_id,
            segment = %segment,
            rule = rule_name,
            "Customer segmented"
        );

        SegmentAssignment {
            segment,
            confidence: SEGMENT_CONFIDENCE,
            reasoning: reasoning.to_string(),
        }
    }

    /// Segment every customer, preserving input order.
    pub fn evaluate_batch(&self, batch: &[CustomerMetrics]) -> Vec<SegmentAssignment> {
        batch.iter().map(|m| self.evaluate(m)).collect()
    }
}

impl Default for SegmentationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::fixtures::metrics;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rule_table() {
        // (spend, orders, days since, frequency) → segment
        let cases = vec![
            (dec!(60000), 3, 10, 0.5, Segment::Vip),
            (dec!(20000), 4, 5, 1.5, Segment::Growth),
            (dec!(12000), 1, 95, 30.0, Segment::Churned),
            (dec!(12000), 5, 75, 0.4, Segment::AtRisk),
            (dec!(12000), 2, 20, 0.8, Segment::New),
            (dec!(12000), 5, 20, 0.8, Segment::Default),
        ];

        let engine = SegmentationEngine::new();
        for (spend, orders, days, freq, expected) in cases {
            let assignment = engine.evaluate(&metrics(spend, orders, days, freq));
            assert_eq!(
                assignment.segment, expected,
                "spend={} orders={} days={} freq={}",
                spend, orders, days, freq
            );
        }
    }

    #[test]
    fn test_vip_wins_even_when_new_also_matches() {
        // One order, high spend, recent: VIP and New predicates both hold.
        let m = metrics(dec!(75000), 1, 3, 30.0);
        assert!(predicates::is_new(&m));
        assert!(predicates::is_growth(&m));
        assert_eq!(SegmentationEngine::new().evaluate(&m).segment, Segment::Vip);
    }

    #[test]
    fn test_growth_checked_before_new() {
        let m = metrics(dec!(20000), 2, 5, 1.5);
        assert!(predicates::is_new(&m));
        assert_eq!(SegmentationEngine::new().evaluate(&m).segment, Segment::Growth);
    }

    #[test]
    fn test_growth_checked_before_churned() {
        let m = metrics(dec!(30000), 2, 120, 1.2);
        assert_eq!(SegmentationEngine::new().evaluate(&m).segment, Segment::Growth);
    }

    #[test]
    fn test_lapsed_big_spender_is_not_vip() {
        let m = metrics(dec!(90000), 6, 70, 0.9);
        assert_eq!(SegmentationEngine::new().evaluate(&m).segment, Segment::AtRisk);
    }

    #[test]
    fn test_confidence_and_reasoning_fixed_per_rule() {
        let engine = SegmentationEngine::new();
        let a = engine.evaluate(&metrics(dec!(12000), 1, 95, 30.0));
        let b = engine.evaluate(&metrics(dec!(48000), 9, 400, 0.1));
        assert_eq!(a.confidence, SEGMENT_CONFIDENCE);
        assert_eq!(a, b);
        assert_eq!(a.reasoning, "Inactive for 90+ days - requires win-back campaign");
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let engine = SegmentationEngine::new();
        let batch = vec![
            metrics(dec!(60000), 3, 10, 0.5),
            metrics(dec!(12000), 5, 75, 0.4),
            metrics(dec!(12000), 5, 20, 0.8),
        ];
        assert_eq!(engine.evaluate_batch(&batch), engine.evaluate_batch(&batch));
        let segments: Vec<Segment> = engine.evaluate_batch(&batch).iter().map(|a| a.segment).collect();
        assert_eq!(segments, vec![Segment::Vip, Segment::AtRisk, Segment::Default]);
    }

    #[test]
    fn test_table_without_catch_all_falls_back_to_default() {
        let rules = default_rules().into_iter().filter(|r| r.name == "vip").collect();
        let engine = SegmentationEngine::with_rules(rules);
        let assignment = engine.evaluate(&metrics(dec!(12000), 5, 20, 0.8));
        assert_eq!(assignment.segment, Segment::Default);
        assert_eq!(assignment.confidence, SEGMENT_CONFIDENCE);
    }

    #[test]
    fn test_reordering_rules_changes_outcome() {
        let mut rules = default_rules();
        // Move "new" to the front.
        let new_rule = rules.remove(4);
        rules.insert(0, new_rule);
        let engine = SegmentationEngine::with_rules(rules);
        assert_eq!(engine.evaluate(&metrics(dec!(75000), 1, 3, 30.0)).segment, Segment::New);
    }

    #[test]
    fn test_default_table_order() {
        let names: Vec<&str> = SegmentationEngine::new().rules().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["vip", "growth", "churned", "at_risk", "new", "default"]);
    }
}

//! Campaign routing — maps a segmented customer onto one of six campaign paths.

use campaign_core::types::{CampaignPath, CustomerMetrics, Segment};
use tracing::debug;

use crate::predicates::{self, RouteRule};

/// Routing rows in evaluation order. The lapsing-growth row must stay ahead
/// of the catch-all so it overrides the plain Growth treatment.
pub fn default_routes() -> Vec<RouteRule> {
    vec![
        RouteRule {
            name: "vip",
            predicate: |segment, _| segment == Segment::Vip,
            path: CampaignPath::PremiumCampaign,
        },
        RouteRule {
            name: "at_risk",
            predicate: |segment, _| segment == Segment::AtRisk,
            path: CampaignPath::ReengagementCampaign,
        },
        RouteRule {
            name: "new",
            predicate: |segment, _| segment == Segment::New,
            path: CampaignPath::OnboardingCampaign,
        },
        RouteRule {
            name: "winback",
            predicate: predicates::is_lapsing_growth,
            path: CampaignPath::WinbackCampaign,
        },
        RouteRule {
            name: "churned",
            predicate: |segment, _| segment == Segment::Churned,
            path: CampaignPath::SpecialOfferCampaign,
        },
    ]
}

pub struct RoutingEngine {
    routes: Vec<RouteRule>,
}

impl RoutingEngine {
    pub fn new() -> Self {
        Self {
            routes: default_routes(),
        }
    }

    pub fn routes(&self) -> &[RouteRule] {
        &self.routes
    }

    /// First matching route, or the standard campaign.
    pub fn route(&self, segment: Segment, metrics: &CustomerMetrics) -> CampaignPath {
        let path = self
            .routes
            .iter()
            .find(|r| r.matches(segment, metrics))
            .map(|r| r.path)
            .unwrap_or(CampaignPath::StandardCampaign);

        debug!(
            customer_id = %metrics.customer_id,
            segment = %segment,
            path = %path,
            "Customer routed"
        );

        path
    }
}

impl Default for RoutingEngine {
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
    fn test_route_table() {
        let engine = RoutingEngine::new();
        let recent = metrics(dec!(20000), 4, 10, 2.0);
        let lapsing = metrics(dec!(20000), 4, 45, 2.0);

        let cases = vec![
            (Segment::Vip, &recent, CampaignPath::PremiumCampaign),
            (Segment::AtRisk, &recent, CampaignPath::ReengagementCampaign),
            (Segment::New, &recent, CampaignPath::OnboardingCampaign),
            (Segment::Growth, &lapsing, CampaignPath::WinbackCampaign),
            (Segment::Growth, &recent, CampaignPath::StandardCampaign),
            (Segment::Churned, &lapsing, CampaignPath::SpecialOfferCampaign),
            (Segment::Default, &recent, CampaignPath::StandardCampaign),
            (Segment::Default, &lapsing, CampaignPath::StandardCampaign),
        ];

        for (segment, m, expected) in cases {
            assert_eq!(engine.route(segment, m), expected, "segment={}", segment);
        }
    }

    #[test]
    fn test_growth_winback_boundary() {
        let engine = RoutingEngine::new();
        assert_eq!(
            engine.route(Segment::Growth, &metrics(dec!(20000), 4, 30, 2.0)),
            CampaignPath::StandardCampaign
        );
        assert_eq!(
            engine.route(Segment::Growth, &metrics(dec!(20000), 4, 31, 2.0)),
            CampaignPath::WinbackCampaign
        );
    }

    #[test]
    fn test_segment_alone_decides_non_growth_paths() {
        let engine = RoutingEngine::new();
        let stale = metrics(dec!(60000), 3, 400, 0.1);
        assert_eq!(engine.route(Segment::Vip, &stale), CampaignPath::PremiumCampaign);
        assert_eq!(engine.route(Segment::New, &stale), CampaignPath::OnboardingCampaign);
    }

    #[test]
    fn test_every_segment_routes() {
        let engine = RoutingEngine::new();
        let m = metrics(dec!(20000), 4, 45, 2.0);
        for segment in Segment::ALL {
            // Total over all segments; must never panic.
            let _ = engine.route(segment, &m);
        }
        assert_eq!(engine.routes().len(), 5);
    }
}

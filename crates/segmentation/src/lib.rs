//! Customer decision pipeline — order aggregation, behavioral metrics,
//! lifecycle segmentation and campaign routing.

pub mod aggregator;
pub mod engine;
pub mod metrics;
pub mod predicates;
pub mod routing;

pub use aggregator::{CustomerAggregate, OrderAggregator};
pub use engine::SegmentationEngine;
pub use metrics::CustomerMetricsCalculator;
pub use routing::RoutingEngine;

//! Campaign analytics — ROI estimation over finished batches, analytics
//! sinks, and the bounded campaign memory log.

pub mod calculator;
pub mod memory;
pub mod sink;

pub use calculator::AnalyticsCalculator;
pub use memory::CampaignMemory;
pub use sink::{AnalyticsSink, MemorySink, TracingSink};

//! Campaign workflow — runs one campaign batch end to end: order source,
//! metrics, segmentation, routing, bounded delivery fan-out and analytics.

pub mod processor;
pub mod runner;

pub use processor::{CustomerJob, CustomerProcessor, DeliveryFlags, ProcessedCustomer};
pub use runner::{CampaignRunner, Connectors, NO_HIGH_VALUE_SUMMARY};

//! Customer data platform boundary — the injectable order source the
//! campaign pipeline reads ERP orders and customer master data from.

pub mod source;
pub mod synthetic;

pub use source::{OrderExport, OrderSource, SourceBatch, StaticOrderSource};
pub use synthetic::SyntheticOrderSource;

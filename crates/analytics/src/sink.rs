//! Analytics sinks — where finished campaign reports are handed off.

use crate::memory::CampaignMemory;
use campaign_core::types::AnalyticsReport;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

pub trait AnalyticsSink: Send + Sync {
    fn record(&self, report: &AnalyticsReport, recorded_at: DateTime<Utc>);
}

/// Emits the report as a structured log line and updates gauges.
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn record(&self, report: &AnalyticsReport, _recorded_at: DateTime<Utc>) {
        metrics::gauge!("campaign.last_run.processed").set(report.total_processed as f64);
        metrics::gauge!("campaign.last_run.emails_sent").set(report.emails_sent as f64);
        info!(
            total_processed = report.total_processed,
            emails_sent = report.emails_sent,
            high_value = report.high_value_count,
            roi = %report.estimated_roi,
            segments = ?report.segments,
            "Campaign analytics recorded"
        );
    }
}

/// Writes a plain-text summary of each report into the campaign memory.
pub struct MemorySink {
    memory: Arc<CampaignMemory>,
}

impl MemorySink {
    pub fn new(memory: Arc<CampaignMemory>) -> Self {
        Self { memory }
    }
}

impl AnalyticsSink for MemorySink {
    fn record(&self, report: &AnalyticsReport, recorded_at: DateTime<Utc>) {
        self.memory
            .append_summary(summarize(report, recorded_at), recorded_at);
    }
}

pub fn summarize(report: &AnalyticsReport, recorded_at: DateTime<Utc>) -> String {
    let segments = report
        .segments
        .iter()
        .map(|(name, count)| format!("{}: {}", name, count))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Campaign executed at {}:\n- Processed {} customers\n- Segments: {{{}}}\n- Estimated ROI: {}",
        recorded_at.to_rfc3339(),
        report.total_processed,
        segments,
        report.estimated_roi
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn report() -> AnalyticsReport {
        let mut segments = BTreeMap::new();
        segments.insert("Growth".to_string(), 1);
        segments.insert("VIP".to_string(), 2);
        AnalyticsReport {
            total_processed: 3,
            segments,
            emails_sent: 3,
            high_value_count: 3,
            estimated_roi: "1234.5%".into(),
        }
    }

    #[test]
    fn test_summary_text() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap();
        let text = summarize(&report(), at);
        assert!(text.starts_with("Campaign executed at 2024-02-01T08:30:00+00:00:"));
        assert!(text.contains("- Processed 3 customers"));
        assert!(text.contains("- Segments: {Growth: 1, VIP: 2}"));
        assert!(text.ends_with("- Estimated ROI: 1234.5%"));
    }

    #[test]
    fn test_memory_sink_appends() {
        let memory = Arc::new(CampaignMemory::new(5));
        let sink = MemorySink::new(memory.clone());
        sink.record(&report(), Utc::now());
        sink.record(&AnalyticsReport::empty(), Utc::now());

        assert_eq!(memory.len(), 2);
        assert!(memory.recent(1)[0].summary.contains("Estimated ROI: 0%"));
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_recorder() {
        TracingSink.record(&report(), Utc::now());
    }
}

//! CRM activity log — one row per campaign outcome.

use anyhow::Result;
use async_trait::async_trait;
use campaign_core::types::CampaignOutcome;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::info;

#[async_trait]
pub trait CrmLogger: Send + Sync {
    async fn log(&self, outcome: &CampaignOutcome) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmRow {
    pub customer_id: String,
    pub email: String,
    pub segment: String,
    pub sent: bool,
    pub logged_at: DateTime<Utc>,
}

/// Rows kept by [`InMemoryCrmLog::new`].
pub const DEFAULT_CRM_LOG_CAPACITY: usize = 1000;

/// Keeps the most recent logged rows in process; stands in for the tracking
/// sheet. The oldest row is dropped once `capacity` is reached.
pub struct InMemoryCrmLog {
    capacity: usize,
    rows: Mutex<VecDeque<CrmRow>>,
}

impl InMemoryCrmLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CRM_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            rows: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Retained rows, oldest first.
    pub fn rows(&self) -> Vec<CrmRow> {
        self.rows.lock().iter().cloned().collect()
    }
}

impl Default for InMemoryCrmLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrmLogger for InMemoryCrmLog {
    async fn log(&self, outcome: &CampaignOutcome) -> Result<()> {
        let row = CrmRow {
            customer_id: outcome.customer_id.clone(),
            email: outcome.email.clone(),
            segment: outcome.segment.to_string(),
            sent: outcome.delivered,
            logged_at: Utc::now(),
        };
        info!(customer_id = %row.customer_id, segment = %row.segment, "Campaign logged to CRM");
        let mut rows = self.rows.lock();
        if rows.len() == self.capacity {
            rows.pop_front();
        }
        rows.push_back(row);
        Ok(())
    }
}

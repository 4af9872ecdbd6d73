//! Bounded, append-only log of campaign summaries kept between runs.

use campaign_core::types::MemoryEntry;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;

pub struct CampaignMemory {
    capacity: usize,
    entries: Mutex<VecDeque<MemoryEntry>>,
}

impl CampaignMemory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a summary, evicting the oldest entry once full.
    pub fn append_summary(&self, summary: impl Into<String>, recorded_at: DateTime<Utc>) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(MemoryEntry {
            recorded_at,
            summary: summary.into(),
        });
    }

    /// The newest `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<MemoryEntry> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CampaignMemory {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_append_and_read_recent() {
        let memory = CampaignMemory::new(10);
        memory.append_summary("run 1", t(0));
        memory.append_summary("run 2", t(1));
        memory.append_summary("run 3", t(2));

        let recent: Vec<String> = memory.recent(2).into_iter().map(|e| e.summary).collect();
        assert_eq!(recent, vec!["run 2", "run 3"]);
        assert_eq!(memory.recent(100).len(), 3);
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let memory = CampaignMemory::new(2);
        memory.append_summary("a", t(0));
        memory.append_summary("b", t(1));
        memory.append_summary("c", t(2));

        assert_eq!(memory.len(), 2);
        let all: Vec<String> = memory.recent(10).into_iter().map(|e| e.summary).collect();
        assert_eq!(all, vec!["b", "c"]);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let memory = CampaignMemory::new(0);
        assert_eq!(memory.capacity(), 1);
        memory.append_summary("only", t(0));
        assert_eq!(memory.len(), 1);
        assert!(memory.recent(0).is_empty());
    }
}

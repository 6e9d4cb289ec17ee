//! Recent single-number lookups, newest first. In memory only.

use chrono::Utc;
use common::model::history::HistoryEntry;
use common::model::validation::ValidationResult;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const HISTORY_LIMIT: usize = 5;

#[derive(Clone, Default)]
pub struct HistoryState {
    entries: Arc<RwLock<VecDeque<HistoryEntry>>>,
}

impl HistoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup. Only valid results are kept; the oldest entry is
    /// dropped once the list is full.
    pub async fn record(&self, result: &ValidationResult) {
        if !result.valid {
            return;
        }
        let entry = HistoryEntry {
            number: result.correlation_key().to_string(),
            line_type: result.line_type,
            checked_at: Utc::now(),
        };
        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(HISTORY_LIMIT);
    }

    pub async fn recent(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().cloned().collect()
    }
}

use crate::model::validation::LineType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successful single-number lookup kept in the recent history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub number: String,
    pub line_type: LineType,
    pub checked_at: DateTime<Utc>,
}

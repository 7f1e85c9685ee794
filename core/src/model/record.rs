use serde::{Deserialize, Serialize};

use crate::model::feed::{Cohort, Timestamped};

/// A single history entry lifted out of its card, used by the history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedEntry {
    pub key: String,
    pub card_id: String,
    pub name: String,
    pub major: String,
    pub cohort: Cohort,
    pub timestamp: String,
}

impl Timestamped for FlattenedEntry {
    fn raw_timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// Display-ready table row, regenerated on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub ordinal: usize,
    pub card_id: String,
    pub name: String,
    pub major: String,
    pub cohort: String,
    pub formatted_timestamp: String,
    pub badge: String,
}

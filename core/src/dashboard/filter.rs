use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Named shortcut for a common date selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePreset {
    Today,
    Yesterday,
}

impl DatePreset {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            DatePreset::Today => today,
            DatePreset::Yesterday => today.pred_opt().unwrap_or(today),
        }
    }
}

impl FromStr for DatePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(DatePreset::Today),
            "yesterday" => Ok(DatePreset::Yesterday),
            other => Err(format!("unknown preset `{}` (expected today or yesterday)", other)),
        }
    }
}

/// Which projection a refresh cycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    Live,
    History,
}

/// Date filter selected by the user. Inactive means the board shows today's check-ins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub active: bool,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub preset: Option<DatePreset>,
    pub selected_date: Option<NaiveDate>,
}

impl FilterState {
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Active filter covering `date` from 00:00:00.000 to 23:59:59.999.
    pub fn for_date(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Self {
            active: true,
            start: Some(start),
            end: Some(start + Duration::milliseconds(86_399_999)),
            preset: None,
            selected_date: Some(date),
        }
    }

    /// Both bounds, only when the filter is active.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.active, self.start, self.end) {
            (true, Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        if self.active {
            ViewMode::History
        } else {
            ViewMode::Live
        }
    }
}

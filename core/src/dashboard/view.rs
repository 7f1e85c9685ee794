use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dashboard::filter::ViewMode;
use crate::prelude::AttendError;
use crate::processing::RenderedTable;

/// What a finished refresh cycle pushes into the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewUpdate {
    Table {
        table: RenderedTable,
        last_updated: String,
    },
    Failed {
        mode: ViewMode,
        message: String,
    },
}

impl ViewUpdate {
    pub fn table(&self) -> Option<&RenderedTable> {
        match self {
            ViewUpdate::Table { table, .. } => Some(table),
            ViewUpdate::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ViewUpdate::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Warning,
}

/// Short-lived confirmation or warning shown after a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn from_error(err: &AttendError) -> Self {
        match err {
            AttendError::Validation(message) => Self::warning(message.clone()),
            other => Self::warning(other.to_string()),
        }
    }
}

/// Receiver of display-ready updates. Implemented by the terminal and desktop views.
pub trait AttendanceView: Send + Sync + 'static {
    fn present(&self, update: &ViewUpdate);

    fn notify(&self, notice: &Notice);
}

/// Source of "now" for today's projection and the last-updated stamp.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

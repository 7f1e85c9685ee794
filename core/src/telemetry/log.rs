use log::{info, warn};

use crate::dashboard::filter::ViewMode;
use crate::prelude::AttendError;

/// Emits one summary line per finished refresh cycle.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn record_render(&self, mode: ViewMode, rows: usize, cards: usize) {
        self.record(&format!(
            "{:?} refresh rendered {} rows from {} cards",
            mode, rows, cards
        ));
    }

    pub fn record_failure(&self, mode: ViewMode, err: &AttendError) {
        warn!("{:?} refresh failed: {}", mode, err);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

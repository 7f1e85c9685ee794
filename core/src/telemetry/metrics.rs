use std::sync::Mutex;

/// Counters for the polling loop, shared between the controller and its handle.
pub struct PollMetrics {
    inner: Mutex<PollSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSnapshot {
    pub started: usize,
    pub rendered: usize,
    pub failed: usize,
    pub stale: usize,
}

impl PollMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PollSnapshot::default()),
        }
    }

    pub fn record_started(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.started += 1;
        }
    }

    pub fn record_rendered(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rendered += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn record_stale(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stale += 1;
        }
    }

    pub fn snapshot(&self) -> PollSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            PollSnapshot::default()
        }
    }
}

impl Default for PollMetrics {
    fn default() -> Self {
        Self::new()
    }
}

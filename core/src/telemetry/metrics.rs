use std::sync::Mutex;

/// Running totals across the records and sessions of one workflow run.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records: usize,
    pub windows_accepted: usize,
    pub windows_rejected: usize,
    pub sessions_merged: usize,
    pub sessions_failed: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_analysis(&self, accepted: usize, rejected: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.records += 1;
            metrics.windows_accepted += accepted;
            metrics.windows_rejected += rejected;
        }
    }

    pub fn record_session(&self, merged: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            if merged {
                metrics.sessions_merged += 1;
            } else {
                metrics.sessions_failed += 1;
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

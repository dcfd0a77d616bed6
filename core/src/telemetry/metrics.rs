use std::sync::Mutex;

/// Counts submissions and failed interactions across one workflow
/// instance.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    submissions: usize,
    failures: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                submissions: 0,
                failures: 0,
            }),
        }
    }

    pub fn record_submission(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.submissions += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failures += 1;
        }
    }

    /// (submissions, failures) counted so far.
    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.submissions, metrics.failures)
        } else {
            (0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

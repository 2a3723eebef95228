// 📡 Monitoring - where degraded-but-continue failures go
//
// Best-effort steps hand their MonitoredFailure values here instead of
// propagating them. The default sink writes tracing events under the
// "monitoring" target so they can be routed to alerting separately.

use crate::error::MonitoredFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Info,
}

pub trait Monitor: Send + Sync {
    fn capture_message(&self, message: &str, level: Level);

    fn capture_failure(&self, failure: &MonitoredFailure) {
        self.capture_message(&failure.to_string(), Level::Error);
    }
}

/// Monitor backed by `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMonitor;

impl Monitor for TracingMonitor {
    fn capture_message(&self, message: &str, level: Level) {
        match level {
            Level::Error => tracing::error!(target: "monitoring", "{message}"),
            Level::Warning => tracing::warn!(target: "monitoring", "{message}"),
            Level::Info => tracing::info!(target: "monitoring", "{message}"),
        }
    }
}

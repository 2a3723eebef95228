// ⚠️ Error types
//
// Two families:
// - QueueError: fatal to the current message, surfaced to the queue layer
// - MonitoredFailure: degraded-but-continue, only ever handed to a Monitor
//
// ServiceError covers the outbound HTTP clients.

use std::fmt;
use thiserror::Error;

// ============================================================================
// QUEUE ERRORS (fatal to this message)
// ============================================================================

#[derive(Debug, Error)]
pub enum QueueError {
    /// Filing could not be applied to the registry
    #[error("{0}")]
    Processing(String),

    #[error("filing {0} not found")]
    FilingNotFound(i64),

    #[error("unsupported filing type: {0}")]
    UnsupportedFiling(String),

    #[error("invalid queue message: {0}")]
    InvalidMessage(#[from] serde_json::Error),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

impl QueueError {
    pub fn processing(message: impl Into<String>) -> Self {
        QueueError::Processing(message.into())
    }
}

// ============================================================================
// SERVICE ERRORS (outbound clients)
// ============================================================================

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("no access token in auth response")]
    MissingToken,
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Request(err.to_string())
        }
    }
}

// ============================================================================
// MONITORED FAILURES (never propagated)
// ============================================================================

/// Which best-effort step produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Affiliation,
    ConsumeNr,
    BusinessProfile,
}

/// A failure that is reported to monitoring but never stops processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredFailure {
    pub filing_id: i64,
    pub component: Component,
    pub message: String,
}

impl MonitoredFailure {
    pub fn new(filing_id: i64, component: Component, message: impl Into<String>) -> Self {
        MonitoredFailure {
            filing_id,
            component,
            message: message.into(),
        }
    }
}

impl fmt::Display for MonitoredFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component {
            Component::Affiliation => write!(
                f,
                "Queue Error: Affiliation error for filing:{}, with err:{}",
                self.filing_id, self.message
            ),
            Component::ConsumeNr => write!(
                f,
                "Queue Error: Consume NR error for filing:{}, with err:{}",
                self.filing_id, self.message
            ),
            Component::BusinessProfile => write!(
                f,
                "Queue Error: Update Business for filing:{}, error:{}",
                self.filing_id, self.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitored_failure_message() {
        let failure = MonitoredFailure::new(42, Component::ConsumeNr, "status 500");
        assert_eq!(
            failure.to_string(),
            "Queue Error: Consume NR error for filing:42, with err:status 500"
        );
    }

    #[test]
    fn test_processing_error_is_message_only() {
        let err = QueueError::processing("IA legal_filing:incorporationApplication missing from 7");
        assert_eq!(err.to_string(), "IA legal_filing:incorporationApplication missing from 7");
    }
}

//! Trait abstraction for the submission bridge to enable mocking in tests

use crate::quiz::SubmissionRecord;
use async_trait::async_trait;
use thiserror::Error;

/// What the receiving end answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeReceipt {
    pub status: u16,
    pub body: String,
}

/// Transport failures; these never reach the questionnaire core
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Submit failed ({status})")]
    Status { status: u16, body: String },
    #[error("Submit request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid webhook URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl BridgeError {
    /// Body the receiving end answered with, if it answered at all
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } if !body.trim().is_empty() => Some(body),
            _ => None,
        }
    }
}

/// Hands a finished record to whatever transmits it
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionBridge: Send + Sync {
    /// Short label for logs and the status bar
    fn describe(&self) -> String;

    /// Transmit one record
    async fn submit(&self, record: &SubmissionRecord) -> Result<BridgeReceipt, BridgeError>;
}

//! Submission bridge: the transport behind the questionnaire

mod client;
mod traits;

pub use client::from_config;
pub use traits::{BridgeError, BridgeReceipt, SubmissionBridge};

#[cfg(test)]
pub use client::DryRunBridge;
#[cfg(test)]
pub use traits::MockSubmissionBridge;

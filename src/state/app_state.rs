//! Application state definitions

use crate::progress::ProgressGauge;
use crate::quiz::FieldId;

/// Current view in the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Quiz,
    /// The questionnaire could not be built; nothing is interactive
    Inert,
}

/// Lifecycle of the last submission
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    InFlight,
    Delivered {
        response_id: String,
        body: String,
    },
    Failed {
        message: String,
        /// What the receiving end answered, when it answered
        body: Option<String>,
    },
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    pub current_view: View,
    pub focused_field: Option<FieldId>,
    pub progress: ProgressGauge,
    pub submission: SubmissionStatus,
    /// One-line message for the status bar
    pub status_message: Option<String>,
    /// Why the questionnaire went inert
    pub init_error: Option<String>,
}

impl AppState {
    /// State of a questionnaire that failed to initialise
    pub fn inert(error: String) -> Self {
        Self {
            current_view: View::Inert,
            init_error: Some(error),
            ..Default::default()
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.submission, SubmissionStatus::InFlight)
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self.submission, SubmissionStatus::Delivered { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.submission, SubmissionStatus::Failed { .. })
    }
}

//! Questionnaire domain layer
//!
//! Everything here is independent of the terminal: the definition and its
//! arena, validation rules, error presentation state, the step/branch state
//! machine and the submission record assembler.

mod context;
mod controller;
mod definition;
mod field;
mod payload;
mod presenter;
mod questionnaire;
mod validator;

pub use context::{QueryParams, SubmissionContext};
pub use controller::{Effect, QuizEvent, StepController};
pub use definition::{DefinitionError, QuizDefinition};
pub use field::{Field, FieldId, FieldKind};
pub use payload::SubmissionRecord;
pub use presenter::ErrorMessage;
pub use questionnaire::{FieldChange, Questionnaire};

#[cfg(test)]
pub use payload::assemble;

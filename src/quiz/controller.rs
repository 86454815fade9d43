//! Step/branch state machine
//!
//! The controller owns the questionnaire document, the current step and the
//! selected branch. Every user action is fed through [`StepController::handle`],
//! which mutates the state synchronously and returns the presentation
//! effects the host has to carry out (focus, progress, submission).

use super::context::SubmissionContext;
use super::definition::Branch;
use super::field::FieldId;
use super::payload::{self, SubmissionRecord};
use super::presenter::ErrorPresenter;
use super::questionnaire::{FieldChange, Questionnaire};
use super::validator::{self, ValidationFailure};

/// Current position in the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormState {
    /// 1-based step index
    pub current_step: usize,
    /// Unset until step 1 has been confirmed
    pub branch: Option<Branch>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            current_step: 1,
            branch: None,
        }
    }
}

/// User-originated input
#[derive(Debug, Clone)]
pub enum QuizEvent {
    Next,
    Prev,
    Submit(SubmissionContext),
    FieldChanged(FieldChange),
}

/// Work for the host after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Focus(FieldId),
    Progress { current: usize, total: usize },
    Rejected(ValidationFailure),
    Submit(Box<SubmissionRecord>),
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: FormState,
    pub effects: Vec<Effect>,
}

#[cfg(test)]
impl Transition {
    pub fn is_rejected(&self) -> bool {
        self.effects.iter().any(|e| matches!(e, Effect::Rejected(_)))
    }

    pub fn record(&self) -> Option<&SubmissionRecord> {
        self.effects.iter().find_map(|e| match e {
            Effect::Submit(record) => Some(record.as_ref()),
            _ => None,
        })
    }
}

pub struct StepController {
    doc: Questionnaire,
    state: FormState,
    presenter: ErrorPresenter,
}

impl StepController {
    pub fn new(doc: Questionnaire) -> Self {
        Self {
            doc,
            state: FormState::default(),
            presenter: ErrorPresenter::new(),
        }
    }

    /// Enter step 1 and report the initial effects
    pub fn start(&mut self) -> Transition {
        let mut effects = Vec::new();
        self.enter(1, &mut effects);
        self.transition(effects)
    }

    pub fn handle(&mut self, event: QuizEvent) -> Transition {
        let mut effects = Vec::new();

        match event {
            QuizEvent::Next => {
                if self.validate_current(&mut effects) {
                    if self.state.current_step == 1 {
                        self.apply_branch();
                    }
                    match self.next_target() {
                        Some(target) => self.enter(target, &mut effects),
                        None => tracing::debug!(
                            step = self.state.current_step,
                            "next ignored on last step"
                        ),
                    }
                }
            }
            QuizEvent::Prev => {
                let target = self.prev_target();
                self.enter(target, &mut effects);
            }
            QuizEvent::Submit(context) => {
                if self.validate_current(&mut effects) {
                    let record = payload::assemble(&self.doc, self.state.branch, &context);
                    tracing::info!(
                        response_id = record.response_id(),
                        branch = ?self.state.branch,
                        "questionnaire submitted"
                    );
                    effects.push(Effect::Submit(Box::new(record)));
                }
            }
            QuizEvent::FieldChanged(change) => {
                if self.doc.apply_change(&change) {
                    let fields = self.current_fields();
                    self.presenter.clear_errors(&mut self.doc, &fields);
                } else {
                    tracing::debug!(?change, "field change ignored");
                }
            }
        }

        self.transition(effects)
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn document(&self) -> &Questionnaire {
        &self.doc
    }

    pub fn presenter(&self) -> &ErrorPresenter {
        &self.presenter
    }

    /// Fields of the visible step(s) at the current index
    pub fn current_fields(&self) -> Vec<FieldId> {
        self.doc
            .visible_fields(self.state.current_step, self.state.branch)
    }

    /// True when `next` would not move anywhere
    pub fn is_last_step(&self) -> bool {
        self.next_target().is_none()
    }

    pub fn is_first_step(&self) -> bool {
        self.state.current_step == 1
    }

    fn transition(&self, effects: Vec<Effect>) -> Transition {
        Transition {
            state: self.state,
            effects,
        }
    }

    /// Branch from the step-1 selection, recomputed on every confirmation
    fn apply_branch(&mut self) {
        let selected = self.doc.selected_value(self.doc.branch_field());
        self.state.branch = selected.and_then(|value| match value.parse() {
            Ok(branch) => Some(branch),
            Err(err) => {
                tracing::warn!(%err, "step 1 selection does not name a branch");
                None
            }
        });
        tracing::debug!(branch = ?self.state.branch, "branch applied");
    }

    /// First index after the current one with a visible step
    fn next_target(&self) -> Option<usize> {
        let total = self.doc.total_steps();
        let branch = self.state.branch;
        (self.state.current_step + 1..=total).find(|i| self.doc.has_visible_step(*i, branch))
    }

    /// Last index before the current one with a visible step, else step 1
    fn prev_target(&self) -> usize {
        let branch = self.state.branch;
        (1..self.state.current_step)
            .rev()
            .find(|i| self.doc.has_visible_step(*i, branch))
            .unwrap_or(1)
    }

    fn validate_current(&mut self, effects: &mut Vec<Effect>) -> bool {
        let fields = self.current_fields();
        self.presenter.clear_errors(&mut self.doc, &fields);

        match validator::validate_fields(&self.doc, &fields) {
            Ok(()) => true,
            Err(failure) => {
                self.presenter.show_banner(failure.rule.banner_message());
                self.presenter.show_field_error(
                    &mut self.doc,
                    &fields,
                    failure.field,
                    failure.rule.field_message(),
                );
                tracing::debug!(
                    step = self.state.current_step,
                    rule = %failure.rule,
                    "step rejected"
                );
                effects.push(Effect::Rejected(failure));
                effects.push(Effect::Focus(failure.field));
                false
            }
        }
    }

    fn enter(&mut self, target: usize, effects: &mut Vec<Effect>) {
        self.state.current_step = target.clamp(1, self.doc.total_steps());

        let fields = self.current_fields();
        self.presenter.clear_errors(&mut self.doc, &fields);
        if let Some(first) = fields.first() {
            effects.push(Effect::Focus(*first));
        }
        effects.push(Effect::Progress {
            current: self.state.current_step,
            total: self.doc.total_steps(),
        });
        tracing::debug!(
            step = self.state.current_step,
            branch = ?self.state.branch,
            "step shown"
        );
    }
}

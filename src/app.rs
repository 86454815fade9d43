//! Application state and core logic

use crate::bridge::{self, BridgeError, BridgeReceipt, SubmissionBridge};
use crate::config::QuizConfig;
use crate::progress;
use crate::quiz::{
    DefinitionError, Effect, Field, FieldChange, FieldKind, QueryParams, Questionnaire,
    QuizDefinition, QuizEvent, StepController, SubmissionContext, SubmissionRecord,
};
use crate::state::{AppState, SubmissionStatus, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Result of a background submission
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub response_id: String,
    pub result: Result<BridgeReceipt, BridgeError>,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Absent when the questionnaire failed to initialise
    controller: Option<StepController>,
    bridge: Arc<dyn SubmissionBridge>,
    query: QueryParams,
    form_id: Option<String>,
    outcome_tx: mpsc::UnboundedSender<SubmissionOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<SubmissionOutcome>,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App from the loaded configuration
    pub fn new(config: &QuizConfig) -> Result<Self> {
        let definition = match &config.definition_path {
            Some(path) => QuizDefinition::load(path),
            None => Ok(QuizDefinition::video_impact()),
        };
        let query = QueryParams::parse(config.query.as_deref().unwrap_or(""));
        let bridge = bridge::from_config(config)?;
        tracing::info!(bridge = %bridge.describe(), "submission bridge ready");

        Ok(Self::with_parts(
            definition,
            query,
            config.form_id.clone(),
            bridge,
        ))
    }

    pub fn with_parts(
        definition: Result<QuizDefinition, DefinitionError>,
        query: QueryParams,
        form_id: Option<String>,
        bridge: Arc<dyn SubmissionBridge>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let mut app = Self {
            state: AppState::default(),
            controller: None,
            bridge,
            query,
            form_id,
            outcome_tx,
            outcome_rx,
            quit: false,
        };

        match definition.and_then(Questionnaire::from_definition) {
            Ok(mut doc) => {
                if app.query.is_stub_mode() {
                    if let Some(id) = doc.inject_transcript_field() {
                        tracing::info!(?id, "test mode: transcript field added");
                    }
                }
                let mut controller = StepController::new(doc);
                let transition = controller.start();
                app.controller = Some(controller);
                app.apply_effects(transition.effects);
            }
            Err(err) => {
                // Logged once; the app stays inert afterwards
                tracing::error!(%err, "questionnaire could not be initialised");
                app.state = AppState::inert(err.to_string());
            }
        }

        app
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn controller(&self) -> Option<&StepController> {
        self.controller.as_ref()
    }

    /// Currently focused field
    pub fn focused(&self) -> Option<&Field> {
        let id = self.state.focused_field?;
        self.controller.as_ref()?.document().field(id)
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            self.quit = true;
            return Ok(());
        }

        if self.state.current_view == View::Inert || self.state.is_delivered() {
            return Ok(());
        }

        // The failure notice takes the key that dismisses it
        if self.state.is_failed() {
            self.state.submission = SubmissionStatus::Idle;
            return Ok(());
        }

        let focused_kind = self.focused().map(|f| f.kind);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('s') if ctrl => self.submit(),
            KeyCode::PageDown => self.dispatch(QuizEvent::Next),
            KeyCode::PageUp => self.dispatch(QuizEvent::Prev),
            KeyCode::Tab | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
            KeyCode::Left => self.adjust_focused(-1),
            KeyCode::Right => self.adjust_focused(1),
            KeyCode::Enter
                if key.modifiers.contains(KeyModifiers::ALT)
                    && focused_kind.is_some_and(FieldKind::is_multiline) =>
            {
                self.edit_focused(|text| text.push('\n'));
            }
            KeyCode::Enter => match focused_kind {
                Some(FieldKind::Radio | FieldKind::Checkbox) => self.activate_focused(),
                _ => self.advance(),
            },
            KeyCode::Char(' ')
                if matches!(focused_kind, Some(FieldKind::Radio | FieldKind::Checkbox)) =>
            {
                self.activate_focused();
            }
            KeyCode::Char(c) if !ctrl => self.edit_focused(|text| text.push(c)),
            KeyCode::Backspace => self.edit_focused(|text| {
                text.pop();
            }),
            _ => {}
        }

        Ok(())
    }

    /// Drain finished submissions into the state
    pub fn poll_submissions(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            match outcome.result {
                Ok(receipt) => {
                    tracing::info!(
                        response_id = %outcome.response_id,
                        status = receipt.status,
                        "submission delivered"
                    );
                    self.state.status_message = Some("Submitted. Thank you!".to_string());
                    self.state.submission = SubmissionStatus::Delivered {
                        response_id: outcome.response_id,
                        body: receipt.body,
                    };
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::error!(
                        response_id = %outcome.response_id,
                        error = %message,
                        body = err.body().unwrap_or_default(),
                        "submission failed"
                    );
                    self.state.status_message = Some(message.clone());
                    self.state.submission = SubmissionStatus::Failed {
                        message,
                        body: err.body().map(str::to_string),
                    };
                }
            }
        }
    }

    /// Next step, or submission on the last one
    fn advance(&mut self) {
        let is_last = self
            .controller
            .as_ref()
            .is_some_and(StepController::is_last_step);
        if is_last {
            self.submit();
        } else {
            self.dispatch(QuizEvent::Next);
        }
    }

    fn submit(&mut self) {
        if self.state.is_submitting() {
            self.state.status_message = Some("Submission already in progress".to_string());
            return;
        }
        let on_last_step = self
            .controller
            .as_ref()
            .is_some_and(StepController::is_last_step);
        if !on_last_step {
            self.state.status_message =
                Some("Finish the remaining steps before submitting".to_string());
            return;
        }

        let context = SubmissionContext::capture(self.query.clone(), self.form_id.clone());
        self.dispatch(QuizEvent::Submit(context));
    }

    fn dispatch(&mut self, event: QuizEvent) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        if !matches!(event, QuizEvent::FieldChanged(_)) {
            self.state.status_message = None;
        }
        let transition = controller.handle(event);
        self.apply_effects(transition.effects);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Focus(field) => self.state.focused_field = Some(field),
                Effect::Progress { current, total } => {
                    progress::notify(Some(&mut self.state.progress), current, total);
                }
                Effect::Rejected(failure) => {
                    tracing::debug!(field = ?failure.field, rule = %failure.rule, "step rejected");
                }
                Effect::Submit(record) => self.spawn_submission(*record),
            }
        }
    }

    /// Hand the record to the bridge without blocking the UI loop
    fn spawn_submission(&mut self, record: SubmissionRecord) {
        self.state.submission = SubmissionStatus::InFlight;
        self.state.status_message = Some("Submitting...".to_string());

        let bridge = Arc::clone(&self.bridge);
        let tx = self.outcome_tx.clone();
        let response_id = record.response_id().to_string();

        tokio::spawn(async move {
            let result = bridge.submit(&record).await;
            let _ = tx.send(SubmissionOutcome {
                response_id,
                result,
            });
        });
    }

    fn move_focus(&mut self, step: isize) {
        let Some(controller) = self.controller.as_ref() else {
            return;
        };
        let fields = controller.current_fields();
        if fields.is_empty() {
            return;
        }
        let len = fields.len() as isize;
        let current = self
            .state
            .focused_field
            .and_then(|id| fields.iter().position(|f| *f == id))
            .map(|p| p as isize)
            .unwrap_or(-1);
        let next = (current + step).rem_euclid(len) as usize;
        self.state.focused_field = Some(fields[next]);
    }

    fn activate_focused(&mut self) {
        let Some(field) = self.focused() else {
            return;
        };
        let change = match field.kind {
            FieldKind::Radio => FieldChange::Select(field.id),
            FieldKind::Checkbox => FieldChange::Toggle(field.id),
            _ => return,
        };
        self.dispatch(QuizEvent::FieldChanged(change));
    }

    fn adjust_focused(&mut self, delta: i64) {
        let Some(field) = self.focused() else {
            return;
        };
        if matches!(field.kind, FieldKind::Range | FieldKind::Select) {
            let change = FieldChange::Adjust {
                field: field.id,
                delta,
            };
            self.dispatch(QuizEvent::FieldChanged(change));
        }
    }

    fn edit_focused<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut String),
    {
        let Some(field) = self.focused() else {
            return;
        };
        if !field.kind.accepts_typing() {
            return;
        }
        let mut value = field.as_text().to_string();
        edit(&mut value);
        let change = FieldChange::Text {
            field: field.id,
            value,
        };
        self.dispatch(QuizEvent::FieldChanged(change));
    }

    /// Focus a field by name; radios resolve to their first member
    #[cfg(test)]
    fn focus_named(&mut self, name: &str) {
        let id = self.controller.as_ref().and_then(|c| {
            c.current_fields()
                .into_iter()
                .find(|id| c.document().field(*id).is_some_and(|f| f.name == name))
        });
        self.state.focused_field = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MockSubmissionBridge;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn idle_bridge() -> Arc<dyn SubmissionBridge> {
        let mut mock = MockSubmissionBridge::new();
        mock.expect_submit().never();
        mock.expect_describe().return_const("mock".to_string());
        Arc::new(mock)
    }

    fn app_with(query: &str, bridge: Arc<dyn SubmissionBridge>) -> App {
        App::with_parts(
            Ok(QuizDefinition::video_impact()),
            QueryParams::parse(query),
            Some("video_impact_quiz_v1".to_string()),
            bridge,
        )
    }

    fn current_step(app: &App) -> usize {
        app.controller().unwrap().state().current_step
    }

    fn field_value(app: &App, name: &str) -> String {
        app.controller()
            .unwrap()
            .document()
            .fields()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.as_text().to_string())
            .unwrap_or_default()
    }

    /// Select a radio member by its option value
    fn choose(app: &mut App, name: &str, option: &str) {
        app.focus_named(name);
        for _ in 0..8 {
            let matches = app
                .focused()
                .is_some_and(|f| f.option.as_deref() == Some(option));
            if matches {
                app.handle_key(key(KeyCode::Enter)).unwrap();
                return;
            }
            app.handle_key(key(KeyCode::Tab)).unwrap();
        }
        panic!("option {option} not found for {name}");
    }

    /// Walk the sales path up to the final step
    fn walk_to_last_step(app: &mut App) {
        choose(app, "q1_priority", "sales");
        app.handle_key(key(KeyCode::PageDown)).unwrap();
        choose(app, "q4_conversion", "book_call");
        app.handle_key(key(KeyCode::PageDown)).unwrap();
        app.focus_named("q5_sales_block");
        type_text(app, "price");
        app.handle_key(key(KeyCode::Enter)).unwrap();
        type_text(app, "A clear demo");
        app.handle_key(key(KeyCode::Enter)).unwrap();
        app.handle_key(key(KeyCode::Right)).unwrap();
        app.handle_key(key(KeyCode::PageDown)).unwrap();
        type_text(app, "https://youtu.be/abc");
        app.handle_key(key(KeyCode::Enter)).unwrap();
    }

    mod startup {
        use super::*;

        #[test]
        fn test_starts_on_first_step() {
            let app = app_with("", idle_bridge());
            assert_eq!(app.state.current_view, View::Quiz);
            assert_eq!(current_step(&app), 1);
            assert_eq!(app.state.progress.label(), "Step 1 of 7");
            assert!(app.focused().is_some_and(|f| f.name == "q1_priority"));
        }

        #[test]
        fn test_invalid_definition_goes_inert() {
            let mut definition = QuizDefinition::video_impact();
            definition.steps.clear();
            let mut app = App::with_parts(Ok(definition), QueryParams::default(), None, idle_bridge());

            assert_eq!(app.state.current_view, View::Inert);
            assert!(app.controller().is_none());
            assert!(app.state.init_error.is_some());

            app.handle_key(key(KeyCode::PageDown)).unwrap();
            app.handle_key(key(KeyCode::Char('x'))).unwrap();
            assert!(!app.should_quit());
        }

        #[test]
        fn test_load_error_goes_inert() {
            let app = App::with_parts(
                Err(DefinitionError::Io("missing.json".to_string())),
                QueryParams::default(),
                None,
                idle_bridge(),
            );
            assert_eq!(app.state.current_view, View::Inert);
        }

        #[test]
        fn test_stub_mode_adds_transcript() {
            let app = app_with("stub=1", idle_bridge());
            let doc = app.controller().unwrap().document();
            assert!(doc.fields().iter().any(|f| f.name == "video_transcript"));
        }

        #[test]
        fn test_no_transcript_outside_stub_mode() {
            let app = app_with("stub=0", idle_bridge());
            let doc = app.controller().unwrap().document();
            assert!(!doc.fields().iter().any(|f| f.name == "video_transcript"));
        }
    }

    mod keys {
        use super::*;

        #[test]
        fn test_esc_quits() {
            let mut app = app_with("", idle_bridge());
            app.handle_key(key(KeyCode::Esc)).unwrap();
            assert!(app.should_quit());
        }

        #[test]
        fn test_next_without_selection_is_rejected() {
            let mut app = app_with("", idle_bridge());
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            let controller = app.controller().unwrap();
            assert_eq!(controller.state().current_step, 1);
            assert_eq!(
                controller.presenter().banner(),
                Some("Please choose an option to continue.")
            );
        }

        #[test]
        fn test_tab_cycles_within_step() {
            let mut app = app_with("", idle_bridge());
            let fields = app.controller().unwrap().current_fields();
            for _ in 0..fields.len() {
                app.handle_key(key(KeyCode::Tab)).unwrap();
            }
            assert_eq!(app.state.focused_field, Some(fields[0]));
            app.handle_key(key(KeyCode::BackTab)).unwrap();
            assert_eq!(app.state.focused_field, fields.last().copied());
        }

        #[test]
        fn test_enter_selects_radio_then_advances() {
            let mut app = app_with("", idle_bridge());
            choose(&mut app, "q1_priority", "sales");
            assert_eq!(current_step(&app), 1);
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            assert_eq!(current_step(&app), 2);
            assert!(app.focused().is_some_and(|f| f.name == "q4_conversion"));
        }

        #[test]
        fn test_typing_and_backspace_edit_focused_text() {
            let mut app = app_with("", idle_bridge());
            choose(&mut app, "q1_priority", "sales");
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            choose(&mut app, "q4_conversion", "buy");
            app.handle_key(key(KeyCode::PageDown)).unwrap();

            type_text(&mut app, "cost");
            app.handle_key(key(KeyCode::Backspace)).unwrap();
            assert_eq!(field_value(&app, "q5_sales_block"), "cos");
        }

        #[test]
        fn test_alt_enter_inserts_newline_in_textarea() {
            let mut app = app_with("", idle_bridge());
            choose(&mut app, "q1_priority", "sales");
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            choose(&mut app, "q4_conversion", "buy");
            app.handle_key(key(KeyCode::PageDown)).unwrap();

            type_text(&mut app, "a");
            app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT))
                .unwrap();
            type_text(&mut app, "b");
            assert_eq!(field_value(&app, "q5_sales_block"), "a\nb");
            assert_eq!(current_step(&app), 3);
        }

        #[test]
        fn test_arrows_adjust_range() {
            let mut app = app_with("", idle_bridge());
            choose(&mut app, "q1_priority", "audience");
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            choose(&mut app, "q2_platform", "youtube");
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            app.focus_named("q3_growth_block");
            type_text(&mut app, "grow");
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            type_text(&mut app, "fast");
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            assert_eq!(current_step(&app), 5);

            app.focus_named("q12_confidence");
            app.handle_key(key(KeyCode::Right)).unwrap();
            app.handle_key(key(KeyCode::Right)).unwrap();
            assert_eq!(field_value(&app, "q12_confidence"), "7");
            app.handle_key(key(KeyCode::Left)).unwrap();
            assert_eq!(field_value(&app, "q12_confidence"), "6");
        }

        #[test]
        fn test_ctrl_s_before_last_step_is_refused() {
            let mut app = app_with("", idle_bridge());
            app.handle_key(ctrl('s')).unwrap();
            assert_eq!(app.state.submission, SubmissionStatus::Idle);
            assert!(app.state.status_message.is_some());
        }

        #[test]
        fn test_page_up_returns_to_previous_step() {
            let mut app = app_with("", idle_bridge());
            choose(&mut app, "q1_priority", "engagement");
            app.handle_key(key(KeyCode::PageDown)).unwrap();
            assert_eq!(current_step(&app), 2);
            app.handle_key(key(KeyCode::PageUp)).unwrap();
            assert_eq!(current_step(&app), 1);
            assert_eq!(app.state.progress.label(), "Step 1 of 7");
        }
    }

    mod submission {
        use super::*;

        async fn wait_for_outcome(app: &mut App) {
            tokio::time::timeout(Duration::from_secs(2), async {
                loop {
                    app.poll_submissions();
                    if !app.state.is_submitting() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            })
            .await
            .unwrap();
        }

        #[tokio::test]
        async fn test_invalid_last_step_does_not_submit() {
            let mut app = app_with("token=t", idle_bridge());
            walk_to_last_step(&mut app);
            assert_eq!(current_step(&app), 7);

            app.handle_key(ctrl('s')).unwrap();
            assert_eq!(app.state.submission, SubmissionStatus::Idle);
            assert!(app.controller().unwrap().presenter().has_errors());
        }

        #[tokio::test]
        async fn test_submit_delivers_record() {
            let mut mock = MockSubmissionBridge::new();
            mock.expect_describe().return_const("mock".to_string());
            mock.expect_submit()
                .times(1)
                .withf(|record| {
                    record.text("token") == Some("t")
                        && record.text("branch") == Some("sales")
                        && record.text("form_id") == Some("video_impact_quiz_v1")
                })
                .returning(|_| {
                    Ok(BridgeReceipt {
                        status: 200,
                        body: "ok".to_string(),
                    })
                });

            let mut app = app_with("token=t", Arc::new(mock));
            walk_to_last_step(&mut app);

            app.focus_named("q14_email");
            type_text(&mut app, "me@example.com");
            app.focus_named("consent");
            app.handle_key(key(KeyCode::Char(' '))).unwrap();
            app.handle_key(ctrl('s')).unwrap();
            assert!(app.state.is_submitting());

            // A second submit while in flight is ignored
            app.handle_key(ctrl('s')).unwrap();

            wait_for_outcome(&mut app).await;
            match &app.state.submission {
                SubmissionStatus::Delivered { response_id, body } => {
                    assert!(response_id.starts_with("viq_"));
                    assert_eq!(body, "ok");
                }
                other => panic!("unexpected status {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_failed_submission_is_reported() {
            let mut mock = MockSubmissionBridge::new();
            mock.expect_describe().return_const("mock".to_string());
            mock.expect_submit().times(1).returning(|_| {
                Err(BridgeError::Status {
                    status: 500,
                    body: "boom".to_string(),
                })
            });

            let mut app = app_with("", Arc::new(mock));
            walk_to_last_step(&mut app);
            app.focus_named("q14_email");
            type_text(&mut app, "me@example.com");
            app.focus_named("consent");
            app.handle_key(key(KeyCode::Enter)).unwrap();
            app.handle_key(ctrl('s')).unwrap();

            wait_for_outcome(&mut app).await;
            assert_eq!(
                app.state.submission,
                SubmissionStatus::Failed {
                    message: "Submit failed (500)".to_string(),
                    body: Some("boom".to_string()),
                }
            );
            assert_eq!(
                app.state.status_message.as_deref(),
                Some("Submit failed (500)")
            );

            // Any key closes the notice and leaves the answers in place
            app.handle_key(key(KeyCode::Tab)).unwrap();
            assert_eq!(app.state.submission, SubmissionStatus::Idle);
            assert_eq!(current_step(&app), 7);
        }
    }
}

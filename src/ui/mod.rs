//! UI module for rendering the TUI

mod field_renderer;
mod layout;
mod notice;
mod step_view;

use crate::app::App;
use crate::state::{SubmissionStatus, View};
use notice::{render_notice, NoticeConfig};
use ratatui::{style::Color, Frame};

const RESPONSE_EXCERPT_CHARS: usize = 240;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match &app.state.current_view {
        View::Quiz => {
            let areas = layout::create_layout(area);
            layout::draw_header(frame, areas.header, app);
            layout::draw_progress(frame, areas.progress, app);
            step_view::draw(frame, areas.body, app);
            layout::draw_status_bar(frame, areas.status, app);

            match &app.state.submission {
                SubmissionStatus::Delivered { response_id, body } => {
                    let mut message = format!(
                        "Your answers are in. We will email your report shortly.\n\nReference: {response_id}"
                    );
                    if let Some(body) = response_excerpt(body) {
                        message.push_str(&format!("\nResponse: {body}"));
                    }
                    render_notice(
                        frame,
                        NoticeConfig {
                            title: "Thank you",
                            color: Color::Green,
                            message: &message,
                            hint: Some("Press Esc to close"),
                            max_width: 64,
                        },
                    );
                }
                SubmissionStatus::Failed { message, body } => {
                    let mut text = message.clone();
                    if let Some(body) = body.as_deref().and_then(response_excerpt) {
                        text.push_str(&format!("\n\nResponse: {body}"));
                    }
                    render_notice(
                        frame,
                        NoticeConfig {
                            title: "Submission failed",
                            color: Color::Red,
                            message: &text,
                            hint: Some("Press any key to return, Esc to quit"),
                            max_width: 64,
                        },
                    );
                }
                SubmissionStatus::Idle | SubmissionStatus::InFlight => {}
            }
        }
        View::Inert => {
            let message = app
                .state
                .init_error
                .as_deref()
                .unwrap_or("The questionnaire could not be started.");
            render_notice(
                frame,
                NoticeConfig {
                    title: "Questionnaire unavailable",
                    color: Color::Red,
                    message,
                    hint: Some("Press Esc to quit"),
                    max_width: 60,
                },
            );
        }
    }
}

/// Single-line excerpt of a response body, `None` when blank
fn response_excerpt(body: &str) -> Option<String> {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return None;
    }
    if flat.chars().count() <= RESPONSE_EXCERPT_CHARS {
        return Some(flat);
    }
    let cut: String = flat.chars().take(RESPONSE_EXCERPT_CHARS).collect();
    Some(format!("{cut}..."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DryRunBridge;
    use crate::quiz::{QueryParams, QuizDefinition};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_first_step_renders_choices_and_progress() {
        let app = App::with_parts(
            Ok(QuizDefinition::video_impact()),
            QueryParams::default(),
            None,
            Arc::new(DryRunBridge),
        );
        let screen = render(&app);
        assert!(screen.contains("Video Impact Quiz"));
        assert!(screen.contains("Step 1 of 7"));
        assert!(screen.contains("( ) Grow my audience"));
        assert!(screen.contains("( ) Get more comments and shares"));
    }

    fn dry_run_app() -> App {
        App::with_parts(
            Ok(QuizDefinition::video_impact()),
            QueryParams::default(),
            None,
            Arc::new(DryRunBridge),
        )
    }

    #[test]
    fn test_delivered_notice_shows_response_body() {
        let mut app = dry_run_app();
        app.state.submission = SubmissionStatus::Delivered {
            response_id: "viq_abc12".to_string(),
            body: "{\"report\": \"queued\"}".to_string(),
        };
        let screen = render(&app);
        assert!(screen.contains("Reference: viq_abc12"));
        assert!(screen.contains("Response: {\"report\": \"queued\"}"));
    }

    #[test]
    fn test_failed_notice_shows_response_body() {
        let mut app = dry_run_app();
        app.state.submission = SubmissionStatus::Failed {
            message: "Submit failed (422)".to_string(),
            body: Some("email already used".to_string()),
        };
        let screen = render(&app);
        assert!(screen.contains("Submission failed"));
        assert!(screen.contains("Submit failed (422)"));
        assert!(screen.contains("Response: email already used"));
    }

    #[test]
    fn test_response_excerpt_flattens_and_truncates() {
        assert_eq!(response_excerpt("  \n "), None);
        assert_eq!(
            response_excerpt("{\n  \"ok\": true\n}").as_deref(),
            Some("{ \"ok\": true }")
        );
        let long = "x".repeat(RESPONSE_EXCERPT_CHARS + 10);
        let excerpt = response_excerpt(&long).unwrap();
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), RESPONSE_EXCERPT_CHARS + 3);
    }

    #[test]
    fn test_inert_app_renders_notice() {
        let mut definition = QuizDefinition::video_impact();
        definition.steps.clear();
        let app = App::with_parts(
            Ok(definition),
            QueryParams::default(),
            None,
            Arc::new(DryRunBridge),
        );
        let screen = render(&app);
        assert!(screen.contains("Questionnaire unavailable"));
        assert!(screen.contains("Press Esc to quit"));
    }
}

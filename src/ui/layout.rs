//! Layout components (header, progress gauge, status bar)

use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use crate::state::SubmissionStatus;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Screen regions of the questionnaire view
pub struct QuizAreas {
    pub header: Rect,
    pub progress: Rect,
    pub body: Rect,
    pub status: Rect,
}

/// Split the screen into header, progress, body and status bar
pub fn create_layout(area: Rect) -> QuizAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Step
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    QuizAreas {
        header: chunks[0],
        progress: chunks[1],
        body: chunks[2],
        status: chunks[3],
    }
}

pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = app
        .controller()
        .map(|c| c.document().title().to_string())
        .unwrap_or_default();

    let header = Paragraph::new(Line::from(Span::styled(
        format!(" {title} "),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, area);
}

pub fn draw_progress(frame: &mut Frame, area: Rect, app: &App) {
    let progress = &app.state.progress;
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(progress.percent())
        .label(progress.label());
    frame.render_widget(gauge, area);
}

pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    let indicator = match &app.state.submission {
        SubmissionStatus::Idle => Span::styled(" ○ ", Style::default().fg(Color::Gray)),
        SubmissionStatus::InFlight => Span::styled(" ◐ ", Style::default().fg(Color::Yellow)),
        SubmissionStatus::Delivered { .. } => {
            Span::styled(" ● ", Style::default().fg(Color::Green))
        }
        SubmissionStatus::Failed { .. } => Span::styled(" ● ", Style::default().fg(Color::Red)),
    };
    spans.push(indicator);

    if let Some(msg) = &app.state.status_message {
        let color = match app.state.submission {
            SubmissionStatus::Failed { .. } => Color::Red,
            SubmissionStatus::Delivered { .. } => Color::Green,
            _ => Color::White,
        };
        spans.push(Span::styled(msg.as_str(), Style::default().fg(color)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    let hints = get_hints(app);
    let hints_width = hints.chars().count() as u16;
    if area.width > hints_width {
        let hints_area = Rect {
            x: area.x + area.width - hints_width,
            y: area.y,
            width: hints_width,
            height: 1,
        };
        let hint = Paragraph::new(hints)
            .style(Style::default().fg(Color::Gray).bg(Color::DarkGray))
            .alignment(Alignment::Right);
        frame.render_widget(hint, hints_area);
    }
}

/// Key hints for the current step
fn get_hints(app: &App) -> String {
    let Some(controller) = app.controller() else {
        return " Esc:quit ".to_string();
    };

    let submit = format!("Enter/{SUBMIT_SHORTCUT}:submit");
    let mut hints = vec!["Tab:field"];
    if !controller.is_first_step() {
        hints.push("PgUp:back");
    }
    if controller.is_last_step() {
        hints.push(submit.as_str());
    } else {
        hints.push("Enter/PgDn:next");
    }
    hints.push("Esc:quit");

    format!(" {} ", hints.join(" | "))
}

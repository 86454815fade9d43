//! Field rendering utilities

use crate::quiz::{ErrorMessage, Field, FieldId, FieldKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const TEXTAREA_HEIGHT: u16 = 6;

/// Rows needed by a single field, borders included
pub fn field_height(field: &Field) -> u16 {
    if field.kind.is_multiline() {
        TEXTAREA_HEIGHT
    } else {
        3
    }
}

fn border_style(invalid: bool, is_active: bool) -> Style {
    if invalid {
        Style::default().fg(Color::Red)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn field_block<'a>(
    title: &str,
    required: bool,
    invalid: bool,
    is_active: bool,
    error: Option<&'a ErrorMessage>,
) -> Block<'a> {
    let marker = if required { " *" } else { "" };
    let mut block = Block::default()
        .title(format!(" {title}{marker} "))
        .borders(Borders::ALL)
        .border_style(border_style(invalid, is_active));
    if let Some(error) = error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} ", error.text),
            Style::default().fg(Color::Red),
        )));
    }
    block
}

/// Draw a single (non-radio) field
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    field: &Field,
    is_active: bool,
    error: Option<&ErrorMessage>,
) {
    let style = if is_active {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if is_active { "▌" } else { "" };

    let content = match field.kind {
        FieldKind::Checkbox => Paragraph::new(Line::from(Span::styled(
            field.display_value(),
            style,
        ))),
        FieldKind::Range => Paragraph::new(Line::from(vec![
            Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
            Span::styled(field.display_value(), style),
            Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
        ])),
        FieldKind::Select => {
            let value = field.as_text();
            let shown = if value.is_empty() { "(choose)" } else { value };
            Paragraph::new(Line::from(vec![
                Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
                Span::styled(shown.to_string(), style),
                Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
            ]))
        }
        _ if field.kind.is_multiline() => {
            let mut lines: Vec<Line> = field
                .as_text()
                .split('\n')
                .map(|l| Line::from(Span::styled(l.to_string(), style)))
                .collect();
            if let Some(last) = lines.last_mut() {
                last.spans
                    .push(Span::styled(cursor, Style::default().fg(Color::Cyan)));
            }
            Paragraph::new(lines)
        }
        _ => {
            let value = field.as_text();
            let shown = if value.is_empty() && !is_active {
                "(empty)"
            } else {
                value
            };
            Paragraph::new(Line::from(vec![
                Span::styled(shown.to_string(), style),
                Span::styled(cursor, Style::default().fg(Color::Cyan)),
            ]))
        }
    };

    // A checkbox carries its text inline
    let title = if field.kind == FieldKind::Checkbox {
        ""
    } else {
        field.label.as_str()
    };
    let block = field_block(title, field.required, field.invalid, is_active, error);

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}

/// Draw the members of one radio group inside a shared box
pub fn draw_choice_group(
    frame: &mut Frame,
    area: Rect,
    members: &[&Field],
    focused: Option<FieldId>,
    error: Option<&ErrorMessage>,
) {
    let Some(first) = members.first() else {
        return;
    };
    let group_active = members.iter().any(|m| Some(m.id) == focused);
    let invalid = members.iter().any(|m| m.invalid);

    let lines: Vec<Line> = members
        .iter()
        .map(|member| {
            let is_active = Some(member.id) == focused;
            let mut style = if member.is_checked() {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            if is_active {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            Line::from(Span::styled(member.display_value(), style))
        })
        .collect();

    let block = field_block(&first.label, first.required, invalid, group_active, error);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

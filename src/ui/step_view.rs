//! Current step rendering

use super::field_renderer::{draw_choice_group, draw_field, field_height};
use crate::app::App;
use crate::quiz::{FieldId, FieldKind, Questionnaire};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One box on screen: a plain field or a whole radio group
#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Single(FieldId),
    Group(Vec<FieldId>),
}

/// Collapse consecutive members of the same radio group into one item
fn group_items(doc: &Questionnaire, fields: &[FieldId]) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();

    for id in fields {
        let Some(field) = doc.field(*id) else {
            continue;
        };
        if field.kind == FieldKind::Radio {
            if let Some(Item::Group(members)) = items.last_mut() {
                let same_group = members
                    .first()
                    .and_then(|m| doc.field(*m))
                    .is_some_and(|m| m.name == field.name);
                if same_group {
                    members.push(*id);
                    continue;
                }
            }
            items.push(Item::Group(vec![*id]));
        } else {
            items.push(Item::Single(*id));
        }
    }

    items
}

fn item_height(doc: &Questionnaire, item: &Item) -> u16 {
    match item {
        Item::Single(id) => doc.field(*id).map(field_height).unwrap_or(3),
        Item::Group(members) => members.len() as u16 + 2,
    }
}

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let Some(controller) = app.controller() else {
        return;
    };
    let doc = controller.document();
    let state = controller.state();

    let title = doc
        .visible_steps(state.current_step, state.branch)
        .map(|s| s.title.as_str())
        .collect::<Vec<_>>()
        .join(" / ");

    let border = if controller.presenter().has_errors() {
        Color::Red
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items = group_items(doc, &controller.current_fields());
    let banner = controller.presenter().banner();

    let mut constraints = Vec::with_capacity(items.len() + 2);
    if banner.is_some() {
        constraints.push(Constraint::Length(2));
    }
    constraints.extend(items.iter().map(|i| Constraint::Length(item_height(doc, i))));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);
    let mut slots = chunks.iter().copied();

    if let Some(message) = banner {
        if let Some(slot) = slots.next() {
            let line = Line::from(Span::styled(
                format!("⚠ {message}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
            frame.render_widget(Paragraph::new(line), slot);
        }
    }

    let presenter = controller.presenter();
    let focused = app.state.focused_field;

    for (item, slot) in items.iter().zip(slots) {
        match item {
            Item::Single(id) => {
                if let Some(field) = doc.field(*id) {
                    let is_active = focused == Some(*id);
                    draw_field(frame, slot, field, is_active, presenter.message_for(*id));
                }
            }
            Item::Group(ids) => {
                let members: Vec<_> = ids.iter().filter_map(|id| doc.field(*id)).collect();
                let error = ids.first().and_then(|id| presenter.message_for(*id));
                draw_choice_group(frame, slot, &members, focused, error);
            }
        }
    }
}

//! Validation error presentation state
//!
//! The presenter owns the step banner and the generated per-field messages.
//! It marks fields invalid and links them to their message through the
//! field's `described_by` list, and on clear it only removes the ids it
//! generated itself.

use super::field::{FieldId, FieldKind};
use super::questionnaire::Questionnaire;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};

/// A generated message attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ErrorPresenter {
    banner: Option<String>,
    messages: BTreeMap<FieldId, ErrorMessage>,
    generated: HashSet<String>,
    counter: u64,
}

impl ErrorPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Message attached to `field` (for radios, to the first group member)
    pub fn message_for(&self, field: FieldId) -> Option<&ErrorMessage> {
        self.messages.get(&field)
    }

    pub fn has_errors(&self) -> bool {
        self.banner.is_some() || !self.messages.is_empty()
    }

    pub fn show_banner(&mut self, message: &str) {
        self.banner = Some(message.to_string());
    }

    /// Mark `field` invalid and attach `message` to it. A radio marks every
    /// member of its group among `step_fields` and anchors the message on
    /// the first of them; same-named radios on other steps are untouched.
    pub fn show_field_error(
        &mut self,
        doc: &mut Questionnaire,
        step_fields: &[FieldId],
        field: FieldId,
        message: &str,
    ) {
        let Some(target) = doc.field(field) else {
            return;
        };

        let anchor = if target.kind == FieldKind::Radio {
            let name = target.name.clone();
            let members: Vec<FieldId> = step_fields
                .iter()
                .copied()
                .filter(|id| {
                    doc.field(*id)
                        .is_some_and(|f| f.kind == FieldKind::Radio && f.name == name)
                })
                .collect();
            for id in &members {
                if let Some(member) = doc.field_mut(*id) {
                    member.invalid = true;
                }
            }
            members.first().copied().unwrap_or(field)
        } else {
            field
        };

        let message_id = match self.messages.get_mut(&anchor) {
            Some(existing) => {
                existing.text = message.to_string();
                existing.id.clone()
            }
            None => {
                let name = doc.field(anchor).map(|f| f.name.clone()).unwrap_or_default();
                let id = self.next_id(&name);
                self.generated.insert(id.clone());
                self.messages.insert(
                    anchor,
                    ErrorMessage {
                        id: id.clone(),
                        text: message.to_string(),
                    },
                );
                id
            }
        };

        if let Some(anchor_field) = doc.field_mut(anchor) {
            anchor_field.invalid = true;
            if !anchor_field.described_by.contains(&message_id) {
                anchor_field.described_by.push(message_id);
            }
        }
    }

    /// Remove the banner and every generated message and invalid marker on
    /// `step_fields`, leaving associations this presenter did not create.
    pub fn clear_errors(&mut self, doc: &mut Questionnaire, step_fields: &[FieldId]) {
        self.banner = None;

        for id in step_fields {
            if let Some(field) = doc.field_mut(*id) {
                field.invalid = false;
                let generated = &self.generated;
                field.described_by.retain(|d| !generated.contains(d));
            }
            if let Some(message) = self.messages.remove(id) {
                self.generated.remove(&message.id);
            }
        }
    }

    fn next_id(&mut self, name: &str) -> String {
        self.counter += 1;
        let prefix = if name.is_empty() { "field" } else { name };
        format!(
            "{}-{}-{}",
            prefix,
            to_base36(Utc::now().timestamp_millis().max(0) as u64),
            to_base36(self.counter)
        )
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

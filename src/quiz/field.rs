//! Field value objects

use serde::{Deserialize, Serialize};

/// Position of a field in the questionnaire arena (document order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub usize);

/// Input control type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Url,
    Checkbox,
    Radio,
    Range,
    Select,
    Textarea,
}

impl FieldKind {
    /// Fields whose value is a string rather than a checked flag
    pub fn is_text_like(self) -> bool {
        !matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }

    /// Fields edited by typing characters
    pub fn accepts_typing(self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Email | FieldKind::Url | FieldKind::Textarea
        )
    }

    pub fn is_multiline(self) -> bool {
        matches!(self, FieldKind::Textarea)
    }
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// A single input control of the questionnaire.
///
/// Radio groups are stored as one `Field` per option sharing the same
/// `name`; `option` holds the value submitted when that member is checked.
#[derive(Debug, Clone)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub value: FieldValue,
    /// Submitted value of a radio member
    pub option: Option<String>,
    /// Text shown next to a radio member
    pub option_label: Option<String>,
    /// Choices of a select field
    pub choices: Vec<String>,
    /// Inclusive bounds of a range field
    pub bounds: Option<(i64, i64)>,
    /// Ids of texts describing this field (help text, error messages)
    pub described_by: Vec<String>,
    pub invalid: bool,
}

impl Field {
    pub fn new(id: FieldId, name: &str, label: &str, kind: FieldKind) -> Self {
        let value = if kind.is_text_like() {
            FieldValue::Text(String::new())
        } else {
            FieldValue::Checked(false)
        };
        Self {
            id,
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            value,
            option: None,
            option_label: None,
            choices: Vec::new(),
            bounds: None,
            described_by: Vec::new(),
            invalid: false,
        }
    }

    /// Get the text value (empty for checkbox and radio members)
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) => s,
            FieldValue::Checked(_) => "",
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self.value, FieldValue::Checked(true))
    }

    pub fn set_text(&mut self, value: String) {
        self.value = FieldValue::Text(value);
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.value = FieldValue::Checked(checked);
    }

    /// Move a range value by `delta` within its bounds, or cycle a select's
    /// choices. Returns false for every other kind.
    pub fn adjust(&mut self, delta: i64) -> bool {
        match self.kind {
            FieldKind::Range => {
                let (min, max) = self.bounds.unwrap_or((0, 10));
                let current = self.as_text().trim().parse::<i64>().unwrap_or(min);
                let next = current.saturating_add(delta).clamp(min, max);
                self.set_text(next.to_string());
                true
            }
            FieldKind::Select if !self.choices.is_empty() => {
                let len = self.choices.len() as i64;
                let current = self
                    .choices
                    .iter()
                    .position(|c| c == self.as_text())
                    .map(|p| p as i64)
                    .unwrap_or(if delta >= 0 { -1 } else { len });
                let next = (current + delta).rem_euclid(len) as usize;
                self.set_text(self.choices[next].clone());
                true
            }
            _ => false,
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Range => {
                let value = self.as_text().trim().parse::<i64>().unwrap_or(0);
                format!("{}: {} ({})", self.label, value, range_label(value))
            }
            FieldKind::Checkbox | FieldKind::Radio => {
                let mark = match (self.kind, self.is_checked()) {
                    (FieldKind::Radio, true) => "(•)",
                    (FieldKind::Radio, false) => "( )",
                    (_, true) => "[x]",
                    (_, false) => "[ ]",
                };
                let text = self.option_label.as_deref().unwrap_or(&self.label);
                format!("{} {}", mark, text)
            }
            _ => self.as_text().to_string(),
        }
    }
}

/// Live description of a slider value
pub fn range_label(value: i64) -> &'static str {
    if value <= 3 {
        "low"
    } else if value <= 7 {
        "neutral"
    } else {
        "high"
    }
}

//! Required-field validation rules

use super::field::{FieldId, FieldKind};
use super::questionnaire::Questionnaire;
use std::fmt;

/// Why a required field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    NoSelection,
    NotChecked,
    Empty,
    BadFormat,
    BadScheme,
}

impl Rule {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSelection => "no selection",
            Self::NotChecked => "not checked",
            Self::Empty => "empty",
            Self::BadFormat => "bad format",
            Self::BadScheme => "bad scheme",
        }
    }

    /// Message shown next to the field
    pub fn field_message(&self) -> &'static str {
        match self {
            Self::NoSelection => "Select one option.",
            Self::NotChecked => "This box needs to be checked.",
            Self::Empty => "This field is required.",
            Self::BadFormat => "Invalid email format.",
            Self::BadScheme => "Invalid URL.",
        }
    }

    /// Step-level summary shown in the banner
    pub fn banner_message(&self) -> &'static str {
        match self {
            Self::NoSelection => "Please choose an option to continue.",
            Self::NotChecked => "Please check the box to proceed.",
            Self::Empty => "Please complete the required field to continue.",
            Self::BadFormat => "Please enter a valid email address.",
            Self::BadScheme => "Please paste a valid public video link (starts with http/https).",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// First failing required field of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: FieldId,
    pub rule: Rule,
}

/// Check the required fields among `fields`, in order, stopping at the
/// first failure. A radio group is judged by all of its members in
/// `fields` and reported against the first one.
pub fn validate_fields(doc: &Questionnaire, fields: &[FieldId]) -> Result<(), ValidationFailure> {
    let mut seen_groups: Vec<&str> = Vec::new();

    for id in fields {
        let Some(field) = doc.field(*id) else {
            continue;
        };
        if !field.required {
            continue;
        }

        let rule = match field.kind {
            FieldKind::Radio => {
                if seen_groups.contains(&field.name.as_str()) {
                    continue;
                }
                seen_groups.push(&field.name);
                let any_checked = fields
                    .iter()
                    .filter_map(|m| doc.field(*m))
                    .filter(|m| m.kind == FieldKind::Radio && m.name == field.name)
                    .any(|m| m.is_checked());
                (!any_checked).then_some(Rule::NoSelection)
            }
            FieldKind::Checkbox => (!field.is_checked()).then_some(Rule::NotChecked),
            kind => check_text(kind, field.as_text()),
        };

        if let Some(rule) = rule {
            return Err(ValidationFailure { field: *id, rule });
        }
    }

    Ok(())
}

fn check_text(kind: FieldKind, value: &str) -> Option<Rule> {
    if value.trim().is_empty() {
        return Some(Rule::Empty);
    }
    match kind {
        FieldKind::Email if !is_valid_email(value) => Some(Rule::BadFormat),
        FieldKind::Url if !has_web_scheme(value) => Some(Rule::BadScheme),
        _ => None,
    }
}

/// `local@domain.tld` shape: one `@`, no whitespace, and a dot inside the
/// domain with characters on both sides.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Starts with `http://` or `https://`, ignoring case
pub fn has_web_scheme(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

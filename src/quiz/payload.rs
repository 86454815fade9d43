//! Submission record assembly
//!
//! Walks every field of the questionnaire (hidden steps included), merges
//! them into a flat record, renames internal keys to the output schema and
//! fills the schema with empty strings where nothing was collected.

use super::context::SubmissionContext;
use super::definition::Branch;
use super::field::FieldKind;
use super::questionnaire::Questionnaire;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys the downstream consumer expects on every record
pub const OUTPUT_SCHEMA: [&str; 27] = [
    "response_id",
    "timestamp",
    "token",
    "goal",
    "platform_target",
    "growth_struggle",
    "sales_cta",
    "sales_struggle",
    "authority_positioning",
    "authority_struggle",
    "engagement_metric",
    "engagement_struggle",
    "video_link",
    "auto_platform",
    "audience",
    "performance",
    "confidence_score",
    "email",
    "status",
    "ai_report_url",
    "notes",
    "form_id",
    "respondent_id",
    "ip",
    "user_agent",
    "consent",
    "video_transcript",
];

/// Internal field name to output schema key
pub const RENAME_MAP: [(&str, &str); 14] = [
    ("q1_priority", "goal"),
    ("q2_platform", "platform_target"),
    ("q3_growth_block", "growth_struggle"),
    ("q4_conversion", "sales_cta"),
    ("q5_sales_block", "sales_struggle"),
    ("q6_archetype", "authority_positioning"),
    ("q7_authority_block", "authority_struggle"),
    ("q8_engagement_metric", "engagement_metric"),
    ("q9_engagement_block", "engagement_struggle"),
    ("q10_ideal", "audience"),
    ("q11_perf", "performance"),
    ("q12_confidence", "confidence_score"),
    ("q13_video_url", "video_link"),
    ("q14_email", "email"),
];

/// Hostname fragment to platform label, checked in order
const PLATFORMS: [(&str, &str); 6] = [
    ("youtube", "YouTube"),
    ("youtu.be", "YouTube"),
    ("tiktok", "TikTok"),
    ("instagram", "Instagram"),
    ("linkedin", "LinkedIn"),
    ("vimeo", "Vimeo"),
];

const RESPONSE_ID_PREFIX: &str = "viq";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Flag(bool),
    Text(String),
}

impl RecordValue {
    /// Non-empty text or a set flag
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => !s.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) => None,
        }
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for RecordValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMeta {
    pub submitted_at: String,
    pub tz: String,
}

/// The normalized payload handed to the submission bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(flatten)]
    fields: BTreeMap<String, RecordValue>,
    #[serde(rename = "_meta")]
    meta: SubmissionMeta,
}

impl SubmissionRecord {
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(RecordValue::as_text)
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[cfg(test)]
    pub fn meta(&self) -> &SubmissionMeta {
        &self.meta
    }

    pub fn response_id(&self) -> &str {
        self.text("response_id").unwrap_or("")
    }
}

/// Build the record from every field, the branch and the context. Performs
/// no I/O; the same inputs always give the same record.
pub fn assemble(doc: &Questionnaire, branch: Option<Branch>, ctx: &SubmissionContext) -> SubmissionRecord {
    let mut data = merge_fields(doc);

    if let Some(branch) = branch.or_else(|| doc.selected_branch()) {
        data.insert("branch".to_string(), branch.as_str().into());
    }

    for (from, to) in RENAME_MAP {
        if let Some(value) = data.get(from).cloned() {
            data.insert(to.to_string(), value);
        }
    }

    let timestamp = ctx.timestamp();
    data.insert(
        "response_id".to_string(),
        response_id(&timestamp, &ctx.nonce).into(),
    );
    data.insert("timestamp".to_string(), timestamp.as_str().into());
    data.insert("token".to_string(), ctx.query.token().into());
    data.insert("user_agent".to_string(), ctx.user_agent.as_str().into());

    let link = data
        .get("video_link")
        .or_else(|| data.get("q13_video_url"))
        .and_then(RecordValue::as_text)
        .unwrap_or("");
    let platform = detect_platform(link);
    data.insert("auto_platform".to_string(), platform.into());

    let consent = doc
        .fields()
        .iter()
        .find(|f| f.kind == FieldKind::Checkbox && f.name == "consent")
        .map(|f| RecordValue::Flag(f.is_checked()))
        .unwrap_or_else(|| "".into());
    data.insert("consent".to_string(), consent);

    if let Some(form_id) = &ctx.form_id {
        data.insert("form_id".to_string(), form_id.as_str().into());
    }

    for key in OUTPUT_SCHEMA {
        data.entry(key.to_string()).or_insert_with(|| "".into());
    }

    SubmissionRecord {
        fields: data,
        meta: SubmissionMeta {
            submitted_at: timestamp,
            tz: ctx.time_zone.clone(),
        },
    }
}

/// Merge every named field in document order.
///
/// Only a checked radio contributes. A checkbox keeps its first value. A
/// later empty text never replaces an earlier non-empty one.
fn merge_fields(doc: &Questionnaire) -> BTreeMap<String, RecordValue> {
    let mut data: BTreeMap<String, RecordValue> = BTreeMap::new();

    for field in doc.fields() {
        if field.name.is_empty() {
            continue;
        }
        match field.kind {
            FieldKind::Radio => {
                if !field.is_checked() {
                    continue;
                }
                let value = field.option.clone().unwrap_or_default();
                data.insert(field.name.clone(), value.into());
            }
            FieldKind::Checkbox => {
                data.entry(field.name.clone())
                    .or_insert(RecordValue::Flag(field.is_checked()));
            }
            _ => {
                let raw = field.as_text();
                let blank = raw.trim().is_empty();
                let existing = data.get(&field.name);
                if blank && existing.is_some_and(RecordValue::is_truthy) {
                    continue;
                }
                if !blank || existing.is_none() {
                    data.insert(field.name.clone(), raw.into());
                }
            }
        }
    }

    data
}

/// `viq_<timestamp>_<suffix>`
pub fn response_id(timestamp: &str, nonce: &str) -> String {
    format!("{}_{}_{}", RESPONSE_ID_PREFIX, timestamp, nonce)
}

/// Platform label for a video link, empty if unknown or unparsable
pub fn detect_platform(link: &str) -> &'static str {
    let Ok(parsed) = url::Url::parse(link.trim()) else {
        return "";
    };
    let Some(host) = parsed.host_str() else {
        return "";
    };
    let host = host.to_ascii_lowercase();
    PLATFORMS
        .iter()
        .find(|(fragment, _)| host.contains(fragment))
        .map(|(_, label)| *label)
        .unwrap_or("")
}

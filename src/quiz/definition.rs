//! Declarative questionnaire descriptors
//!
//! A [`QuizDefinition`] is the static "markup" of the questionnaire. It is
//! either the built-in video impact quiz or a JSON file, and is turned into
//! a [`Questionnaire`](super::Questionnaire) arena once at start-up.

use super::field::FieldKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Default number of steps when a definition does not declare one
pub const DEFAULT_TOTAL_STEPS: usize = 7;

/// Radio group whose selection on step 1 picks the branch
pub const DEFAULT_BRANCH_FIELD: &str = "q1_priority";

/// Path selected by the step-1 answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Audience,
    Sales,
    Authority,
    Engagement,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audience => "audience",
            Self::Sales => "sales",
            Self::Authority => "authority",
            Self::Engagement => "engagement",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown branch '{0}'")]
pub struct UnknownBranch(pub String);

impl FromStr for Branch {
    type Err = UnknownBranch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audience" => Ok(Self::Audience),
            "sales" => Ok(Self::Sales),
            "authority" => Ok(Self::Authority),
            "engagement" => Ok(Self::Engagement),
            _ => Err(UnknownBranch(s.to_string())),
        }
    }
}

/// Structural problems that make a questionnaire unusable
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("questionnaire has no steps")]
    NoSteps,
    #[error("step index {index} is outside 1..={total}")]
    StepOutOfRange { index: usize, total: usize },
    #[error("no step is defined for index 1")]
    MissingFirstStep,
    #[error("branch step {index} has no branch key")]
    BranchWithoutKey { index: usize },
    #[error("step {index} has branch key '{branch}' but is not a branch step")]
    KeyWithoutBranch { index: usize, branch: Branch },
    #[error("branch selector '{0}' is not a radio group on step 1")]
    MissingBranchField(String),
    #[error("branch selector '{field}' offers '{value}', which names no branch")]
    UnknownBranchOption { field: String, value: String },
    #[error("radio or select field '{0}' has no options")]
    EmptyChoices(String),
    #[error("range field '{name}' has min {min} greater than max {max}")]
    InvalidRange { name: String, min: i64, max: i64 },
    #[error("failed to read questionnaire definition: {0}")]
    Io(String),
    #[error("failed to parse questionnaire definition: {0}")]
    Parse(String),
}

/// One selectable option of a radio group or select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDefinition {
    pub value: String,
    pub label: String,
}

impl ChoiceDefinition {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<ChoiceDefinition>,
    /// Initial value of a text-like field
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    /// Pre-existing accessibility associations (help text ids)
    #[serde(default)]
    pub described_by: Vec<String>,
}

impl FieldDefinition {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            options: Vec::new(),
            value: None,
            min: None,
            max: None,
            described_by: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(value, label)| ChoiceDefinition::new(value, label))
            .collect();
        self
    }

    pub fn with_range(mut self, min: i64, max: i64, value: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.value = Some(value.to_string());
        self
    }

    pub fn described_by(mut self, id: &str) -> Self {
        self.described_by.push(id.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub index: usize,
    pub title: String,
    #[serde(default)]
    pub is_branch: bool,
    #[serde(default)]
    pub branch: Option<Branch>,
    pub fields: Vec<FieldDefinition>,
}

impl StepDefinition {
    pub fn new(index: usize, title: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            index,
            title: title.to_string(),
            is_branch: false,
            branch: None,
            fields,
        }
    }

    pub fn branch(index: usize, branch: Branch, title: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            index,
            title: title.to_string(),
            is_branch: true,
            branch: Some(branch),
            fields,
        }
    }
}

fn default_total_steps() -> usize {
    DEFAULT_TOTAL_STEPS
}

fn default_branch_field() -> String {
    DEFAULT_BRANCH_FIELD.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    pub title: String,
    #[serde(default = "default_total_steps")]
    pub total_steps: usize,
    #[serde(default = "default_branch_field")]
    pub branch_field: String,
    pub steps: Vec<StepDefinition>,
}

impl QuizDefinition {
    /// Load a definition from a JSON file
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DefinitionError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| DefinitionError::Parse(e.to_string()))
    }

    /// The built-in seven step video impact questionnaire
    pub fn video_impact() -> Self {
        use FieldKind::*;

        let steps = vec![
            StepDefinition::new(
                1,
                "What matters most for your videos right now?",
                vec![FieldDefinition::new(DEFAULT_BRANCH_FIELD, "Top priority", Radio)
                    .required()
                    .with_options(&[
                        ("audience", "Grow my audience"),
                        ("sales", "Turn viewers into buyers"),
                        ("authority", "Be seen as the expert"),
                        ("engagement", "Get more comments and shares"),
                    ])],
            ),
            StepDefinition::branch(
                2,
                Branch::Audience,
                "Where do you want to grow?",
                vec![FieldDefinition::new("q2_platform", "Target platform", Radio)
                    .required()
                    .with_options(&[
                        ("youtube", "YouTube"),
                        ("tiktok", "TikTok"),
                        ("instagram", "Instagram"),
                        ("linkedin", "LinkedIn"),
                    ])],
            ),
            StepDefinition::branch(
                2,
                Branch::Sales,
                "What should viewers do after watching?",
                vec![FieldDefinition::new("q4_conversion", "Call to action", Radio)
                    .required()
                    .with_options(&[
                        ("book_call", "Book a call"),
                        ("buy", "Buy now"),
                        ("subscribe", "Join my list"),
                    ])],
            ),
            StepDefinition::branch(
                2,
                Branch::Authority,
                "How do you want to be seen?",
                vec![FieldDefinition::new("q6_archetype", "Positioning", Radio)
                    .required()
                    .with_options(&[
                        ("expert", "The expert"),
                        ("mentor", "The mentor"),
                        ("visionary", "The visionary"),
                    ])],
            ),
            StepDefinition::branch(
                2,
                Branch::Engagement,
                "Which signal matters most?",
                vec![FieldDefinition::new("q8_engagement_metric", "Engagement metric", Radio)
                    .required()
                    .with_options(&[
                        ("comments", "Comments"),
                        ("shares", "Shares"),
                        ("watch_time", "Watch time"),
                    ])],
            ),
            StepDefinition::branch(
                3,
                Branch::Audience,
                "What is holding your growth back?",
                vec![FieldDefinition::new("q3_growth_block", "Biggest obstacle", Textarea).required()],
            ),
            StepDefinition::branch(
                3,
                Branch::Sales,
                "What stops viewers from buying?",
                vec![FieldDefinition::new("q5_sales_block", "Biggest obstacle", Textarea).required()],
            ),
            StepDefinition::branch(
                3,
                Branch::Authority,
                "What keeps you from being seen as the authority?",
                vec![FieldDefinition::new("q7_authority_block", "Biggest obstacle", Textarea)
                    .required()],
            ),
            StepDefinition::branch(
                3,
                Branch::Engagement,
                "Why do viewers stay quiet?",
                vec![FieldDefinition::new("q9_engagement_block", "Biggest obstacle", Textarea)
                    .required()],
            ),
            StepDefinition::new(
                4,
                "Who is your ideal viewer?",
                vec![FieldDefinition::new("q10_ideal", "Ideal viewer", Textarea)
                    .required()
                    .described_by("q10-help")],
            ),
            StepDefinition::new(
                5,
                "How are your videos performing?",
                vec![
                    FieldDefinition::new("q11_perf", "Typical views per video", Select)
                        .required()
                        .with_options(&[
                            ("under_1k", "Under 1k"),
                            ("1k_10k", "1k to 10k"),
                            ("10k_100k", "10k to 100k"),
                            ("over_100k", "Over 100k"),
                        ]),
                    FieldDefinition::new("q12_confidence", "Confidence", Range).with_range(1, 10, 5),
                ],
            ),
            StepDefinition::new(
                6,
                "Share a video you are proud of",
                vec![FieldDefinition::new("q13_video_url", "Public video link", Url).required()],
            ),
            StepDefinition::new(
                7,
                "Where should we send your report?",
                vec![
                    FieldDefinition::new("q14_email", "Email", Email).required(),
                    FieldDefinition::new("consent", "I agree to receive my report by email", Checkbox)
                        .required(),
                ],
            ),
        ];

        Self {
            title: "Video Impact Quiz".to_string(),
            total_steps: DEFAULT_TOTAL_STEPS,
            branch_field: DEFAULT_BRANCH_FIELD.to_string(),
            steps,
        }
    }
}

impl Default for QuizDefinition {
    fn default() -> Self {
        Self::video_impact()
    }
}

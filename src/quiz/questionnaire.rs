//! Step and field arena built once from a definition

use super::definition::{Branch, DefinitionError, FieldDefinition, QuizDefinition};
use super::field::{Field, FieldId, FieldKind};

/// Name of the optional field injected in test mode
pub const TRANSCRIPT_FIELD: &str = "video_transcript";

/// One screen of the questionnaire
#[derive(Debug, Clone)]
pub struct Step {
    pub index: usize,
    pub title: String,
    /// Present only on branch steps
    pub branch: Option<Branch>,
    pub fields: Vec<FieldId>,
}

impl Step {
    pub fn is_branch_step(&self) -> bool {
        self.branch.is_some()
    }

    /// A plain step is visible on its index; a branch step additionally
    /// needs its key to match the selected branch.
    pub fn is_visible(&self, current: usize, branch: Option<Branch>) -> bool {
        if self.index != current {
            return false;
        }
        match self.branch {
            Some(key) => branch == Some(key),
            None => true,
        }
    }
}

/// A user edit to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Replace the value of a text-like field
    Text { field: FieldId, value: String },
    /// Check a radio member, unchecking the rest of its group
    Select(FieldId),
    /// Flip a checkbox
    Toggle(FieldId),
    /// Move a range or select by `delta`
    Adjust { field: FieldId, delta: i64 },
}

impl FieldChange {
    pub fn field(&self) -> FieldId {
        match self {
            Self::Text { field, .. } | Self::Adjust { field, .. } => *field,
            Self::Select(field) | Self::Toggle(field) => *field,
        }
    }
}

/// The questionnaire "document": every step and every field, in order
#[derive(Debug, Clone)]
pub struct Questionnaire {
    title: String,
    total_steps: usize,
    branch_field: String,
    steps: Vec<Step>,
    fields: Vec<Field>,
}

impl Questionnaire {
    pub fn from_definition(def: QuizDefinition) -> Result<Self, DefinitionError> {
        if def.steps.is_empty() || def.total_steps == 0 {
            return Err(DefinitionError::NoSteps);
        }

        let mut steps = Vec::with_capacity(def.steps.len());
        let mut fields = Vec::new();

        for step_def in def.steps {
            if step_def.index == 0 || step_def.index > def.total_steps {
                return Err(DefinitionError::StepOutOfRange {
                    index: step_def.index,
                    total: def.total_steps,
                });
            }
            match (step_def.is_branch, step_def.branch) {
                (true, None) => {
                    return Err(DefinitionError::BranchWithoutKey {
                        index: step_def.index,
                    })
                }
                (false, Some(branch)) => {
                    return Err(DefinitionError::KeyWithoutBranch {
                        index: step_def.index,
                        branch,
                    })
                }
                _ => {}
            }

            let mut ids = Vec::new();
            for field_def in step_def.fields {
                ids.extend(push_field(&mut fields, field_def)?);
            }

            steps.push(Step {
                index: step_def.index,
                title: step_def.title,
                branch: step_def.branch,
                fields: ids,
            });
        }

        if !steps.iter().any(|s| s.index == 1) {
            return Err(DefinitionError::MissingFirstStep);
        }

        let selector: Vec<&Field> = steps
            .iter()
            .filter(|s| s.index == 1)
            .flat_map(|s| s.fields.iter().map(|id| &fields[id.0]))
            .filter(|f| f.kind == FieldKind::Radio && f.name == def.branch_field)
            .collect();
        if selector.is_empty() {
            return Err(DefinitionError::MissingBranchField(def.branch_field));
        }
        for member in selector {
            let value = member.option.as_deref().unwrap_or_default();
            if value.parse::<Branch>().is_err() {
                return Err(DefinitionError::UnknownBranchOption {
                    field: def.branch_field,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            title: def.title,
            total_steps: def.total_steps,
            branch_field: def.branch_field,
            steps,
            fields,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn branch_field(&self) -> &str {
        &self.branch_field
    }

    #[cfg(test)]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.0)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.get_mut(id.0)
    }

    /// Steps shown for `index` under `branch`, in document order
    pub fn visible_steps(
        &self,
        index: usize,
        branch: Option<Branch>,
    ) -> impl Iterator<Item = &Step> + '_ {
        self.steps
            .iter()
            .filter(move |s| s.is_visible(index, branch))
    }

    pub fn has_visible_step(&self, index: usize, branch: Option<Branch>) -> bool {
        self.visible_steps(index, branch).next().is_some()
    }

    /// Fields of every step visible at `index`, in document order
    pub fn visible_fields(&self, index: usize, branch: Option<Branch>) -> Vec<FieldId> {
        self.visible_steps(index, branch)
            .flat_map(|s| s.fields.iter().copied())
            .collect()
    }

    /// Members of a radio group, across the whole document
    #[cfg(test)]
    pub fn group_members<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.kind == FieldKind::Radio && f.name == name)
    }

    /// Value of the checked member of a radio group
    pub fn selected_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.kind == FieldKind::Radio && f.name == name && f.is_checked())
            .and_then(|f| f.option.as_deref())
    }

    /// Branch implied by the current step-1 selection
    pub fn selected_branch(&self) -> Option<Branch> {
        self.selected_value(&self.branch_field)
            .and_then(|value| value.parse().ok())
    }

    /// Apply a user edit. Returns false when the change does not fit the
    /// targeted field (unknown id or wrong kind).
    pub fn apply_change(&mut self, change: &FieldChange) -> bool {
        let Some(field) = self.field(change.field()) else {
            return false;
        };
        let kind = field.kind;

        match change {
            FieldChange::Text { field, value } if kind.is_text_like() => {
                if let Some(f) = self.field_mut(*field) {
                    f.set_text(value.clone());
                }
                true
            }
            FieldChange::Select(id) if kind == FieldKind::Radio => {
                let name = self.fields[id.0].name.clone();
                for f in self.fields.iter_mut() {
                    if f.kind == FieldKind::Radio && f.name == name {
                        f.set_checked(f.id == *id);
                    }
                }
                true
            }
            FieldChange::Toggle(id) if kind == FieldKind::Checkbox => {
                let f = &mut self.fields[id.0];
                let checked = f.is_checked();
                f.set_checked(!checked);
                true
            }
            FieldChange::Adjust { field, delta } => self
                .field_mut(*field)
                .map(|f| f.adjust(*delta))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Add the optional transcript textarea to the last step(s). Does
    /// nothing if it is already present.
    pub fn inject_transcript_field(&mut self) -> Option<FieldId> {
        if self.fields.iter().any(|f| f.name == TRANSCRIPT_FIELD) {
            return None;
        }
        let last = self.total_steps;
        let step_pos = self
            .steps
            .iter()
            .position(|s| s.index == last && !s.is_branch_step())?;

        let def = FieldDefinition::new(
            TRANSCRIPT_FIELD,
            "[TEST] Transcript to include with this submission",
            FieldKind::Textarea,
        );
        let ids = push_field(&mut self.fields, def).ok()?;
        let id = *ids.first()?;
        self.steps[step_pos].fields.push(id);
        Some(id)
    }
}

/// Expand a field definition into arena entries (one per radio option)
fn push_field(fields: &mut Vec<Field>, def: FieldDefinition) -> Result<Vec<FieldId>, DefinitionError> {
    match def.kind {
        FieldKind::Radio => {
            if def.options.is_empty() {
                return Err(DefinitionError::EmptyChoices(def.name));
            }
            let mut ids = Vec::with_capacity(def.options.len());
            for choice in &def.options {
                let id = FieldId(fields.len());
                let mut field = Field::new(id, &def.name, &def.label, FieldKind::Radio);
                field.required = def.required;
                field.option = Some(choice.value.clone());
                field.option_label = Some(choice.label.clone());
                field.described_by = def.described_by.clone();
                fields.push(field);
                ids.push(id);
            }
            Ok(ids)
        }
        kind => {
            if kind == FieldKind::Select && def.options.is_empty() {
                return Err(DefinitionError::EmptyChoices(def.name));
            }
            let id = FieldId(fields.len());
            let mut field = Field::new(id, &def.name, &def.label, kind);
            field.required = def.required;
            field.described_by = def.described_by;
            field.choices = def.options.into_iter().map(|c| c.value).collect();
            if kind == FieldKind::Range {
                let min = def.min.unwrap_or(0);
                let max = def.max.unwrap_or(10);
                if min > max {
                    return Err(DefinitionError::InvalidRange {
                        name: def.name,
                        min,
                        max,
                    });
                }
                field.bounds = Some((min, max));
                let start = def.value.unwrap_or_else(|| ((min + max) / 2).to_string());
                field.set_text(start);
            } else if let Some(value) = def.value {
                if kind.is_text_like() {
                    field.set_text(value);
                }
            }
            fields.push(field);
            Ok(vec![id])
        }
    }
}

//! Blueprint Types
//!
//! A blueprint is a named, reusable field schema. Once added to the catalog it
//! is never edited, so the `blueprint_name` every contract copies at creation
//! time cannot go stale.

use crate::field::{FieldDefinition, FieldType};
use chrono::{DateTime, Utc};
use contractflow_ids::{BlueprintId, FieldId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Minimum blueprint name length accepted by [`BlueprintDraft::validate`].
pub const MIN_NAME_LEN: usize = 3;

/// Minimum description length accepted by [`BlueprintDraft::validate`].
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// A reusable contract template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: BlueprintId,
    pub name: String,
    pub description: String,
    /// Ordered as they appear on the document. Never empty.
    pub fields: Vec<FieldDefinition>,
    pub created_at: DateTime<Utc>,
}

impl Blueprint {
    /// Look up a field by id.
    pub fn field(&self, id: &FieldId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| &f.id == id)
    }

    /// Fields with `required = true`, in blueprint order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn signature_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields
            .iter()
            .filter(|f| f.field_type == FieldType::Signature)
    }

    /// The field the signing flow fills in. Additional signature fields are
    /// left to the caller.
    pub fn first_signature_field(&self) -> Option<&FieldDefinition> {
        self.signature_fields().next()
    }
}

/// A blueprint as submitted from a form, before it enters the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintDraft {
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldDefinition>,
}

impl BlueprintDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields = fields;
        self
    }

    /// Check every form rule and report all failures at once.
    pub fn validate(&self) -> Result<(), BlueprintDraftError> {
        let mut issues = Vec::new();

        if self.name.trim().chars().count() < MIN_NAME_LEN {
            issues.push(DraftIssue::NameTooShort { min: MIN_NAME_LEN });
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
            issues.push(DraftIssue::DescriptionTooShort {
                min: MIN_DESCRIPTION_LEN,
            });
        }
        if self.fields.is_empty() {
            issues.push(DraftIssue::NoFields);
        }

        let mut seen = HashSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.label.trim().is_empty() {
                issues.push(DraftIssue::EmptyLabel { index });
            }
            if !seen.insert(&field.id) {
                issues.push(DraftIssue::DuplicateFieldId {
                    id: field.id.clone(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(BlueprintDraftError { issues })
        }
    }
}

/// One rule a blueprint draft broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftIssue {
    NameTooShort { min: usize },
    DescriptionTooShort { min: usize },
    NoFields,
    EmptyLabel { index: usize },
    DuplicateFieldId { id: FieldId },
}

impl fmt::Display for DraftIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftIssue::NameTooShort { min } => {
                write!(f, "name must be at least {} characters", min)
            }
            DraftIssue::DescriptionTooShort { min } => {
                write!(f, "description must be at least {} characters", min)
            }
            DraftIssue::NoFields => write!(f, "at least one field is required"),
            DraftIssue::EmptyLabel { index } => write!(f, "field {} needs a label", index + 1),
            DraftIssue::DuplicateFieldId { id } => write!(f, "field id {} is used twice", id),
        }
    }
}

/// All issues found in a blueprint draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid blueprint: {}", join_issues(.issues))]
pub struct BlueprintDraftError {
    pub issues: Vec<DraftIssue>,
}

fn join_issues(issues: &[DraftIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

//! Field Schema
//!
//! The typed-field vocabulary usable in any blueprint, and the value shapes
//! each field type accepts.

use chrono::NaiveDate;
use contractflow_ids::FieldId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Date format accepted by `date` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field values keyed by field id.
pub type FieldValues = BTreeMap<FieldId, FieldValue>;

/// The type of a blueprint field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Date,
    Signature,
    Checkbox,
    Number,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Signature => "signature",
            FieldType::Checkbox => "checkbox",
            FieldType::Number => "number",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One typed input slot on a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique within the owning blueprint
    pub id: FieldId,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    pub label: String,

    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldDefinition {
    /// Create a required field
    pub fn required(id: FieldId, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id,
            field_type,
            label: label.into(),
            required: true,
            placeholder: None,
        }
    }

    /// Create an optional field
    pub fn optional(id: FieldId, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(id, field_type, label)
        }
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Check that a value has the shape this field's type accepts.
    pub fn check_value(&self, value: &FieldValue) -> Result<(), FieldValueError> {
        match (self.field_type, value) {
            (FieldType::Text | FieldType::Signature, FieldValue::Text(_)) => Ok(()),
            (FieldType::Checkbox, FieldValue::Flag(_)) => Ok(()),
            (FieldType::Date, FieldValue::Text(text)) => {
                if text.is_empty() || NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok() {
                    Ok(())
                } else {
                    Err(self.invalid(format!("'{}' is not a YYYY-MM-DD date", text)))
                }
            }
            (FieldType::Number, FieldValue::Number(n)) => {
                if n.is_finite() {
                    Ok(())
                } else {
                    Err(self.invalid(format!("{} is not a finite number", n)))
                }
            }
            (FieldType::Number, FieldValue::Text(text)) => {
                if text.is_empty() || text.trim().parse::<f64>().map_or(false, f64::is_finite) {
                    Ok(())
                } else {
                    Err(self.invalid(format!("'{}' is not a number", text)))
                }
            }
            (expected, found) => Err(FieldValueError::TypeMismatch {
                field: self.id.clone(),
                expected,
                found: found.kind(),
            }),
        }
    }

    fn invalid(&self, reason: String) -> FieldValueError {
        FieldValueError::InvalidValue {
            field: self.id.clone(),
            reason,
        }
    }
}

/// A stored field value. Serialized as a bare JSON string, boolean, or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Whether the value counts as filled in for required-field checks.
    pub fn is_set(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.is_empty(),
            FieldValue::Flag(flag) => *flag,
            FieldValue::Number(_) => true,
        }
    }

    /// Name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Flag(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::Flag(true) => write!(f, "Included"),
            FieldValue::Flag(false) => write!(f, "Not Included"),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// A value rejected at the write boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldValueError {
    #[error("Unknown field: {field}")]
    UnknownField { field: FieldId },

    #[error("Field {field} expects a {expected} value, got {found}")]
    TypeMismatch {
        field: FieldId,
        expected: FieldType,
        found: &'static str,
    },

    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: FieldId, reason: String },
}

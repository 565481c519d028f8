//! Contract value validation.
//!
//! Two checks guard the write boundary: every submitted value must belong to
//! a field of the blueprint and fit that field's type, and at creation time
//! every required field must be set. The required check reports all missing
//! labels together.

use crate::blueprint::Blueprint;
use crate::field::{FieldValueError, FieldValues};
use thiserror::Error;

/// Required fields left unset when creating a contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required fields: {}", .missing_labels.join(", "))]
pub struct ValidationError {
    /// Labels in blueprint order
    pub missing_labels: Vec<String>,
}

/// Check that `values` only names fields of `blueprint` and that each value
/// fits its field type.
pub fn validate_values(blueprint: &Blueprint, values: &FieldValues) -> Result<(), FieldValueError> {
    for (id, value) in values {
        let field = blueprint
            .field(id)
            .ok_or_else(|| FieldValueError::UnknownField { field: id.clone() })?;
        field.check_value(value)?;
    }
    Ok(())
}

/// Check that every required field of `blueprint` is set in `values`.
pub fn validate_required(blueprint: &Blueprint, values: &FieldValues) -> Result<(), ValidationError> {
    let missing_labels: Vec<String> = blueprint
        .required_fields()
        .filter(|field| !values.get(&field.id).map_or(false, |v| v.is_set()))
        .map(|field| field.label.clone())
        .collect();

    if missing_labels.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing_labels })
    }
}

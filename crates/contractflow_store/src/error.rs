//! Store error taxonomy.
//!
//! Frozen-state requests are not errors: they come back as
//! `Unchanged` outcomes through `Ok`.

use crate::blueprint::BlueprintDraftError;
use crate::field::FieldValueError;
use crate::validation::ValidationError;
use contractflow_ids::{BlueprintId, ContractId};
use contractflow_lifecycle::{LifecycleHistoryError, TransitionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Blueprint not found: {0}")]
    BlueprintNotFound(BlueprintId),

    #[error("Contract not found: {0}")]
    ContractNotFound(ContractId),

    #[error("Blueprint must define at least one field")]
    EmptyBlueprint,

    #[error("Contract name must not be empty")]
    EmptyContractName,

    #[error("Signature must not be empty")]
    EmptySignature,

    #[error("Contract {contract} cannot be signed: '{label}' is empty")]
    MissingSignature { contract: ContractId, label: String },

    #[error(transparent)]
    Draft(#[from] BlueprintDraftError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Value(#[from] FieldValueError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Invalid lifecycle history: {0}")]
    History(#[from] LifecycleHistoryError),

    #[error("Invalid initial state: {0}")]
    InvalidState(String),
}

impl StoreError {
    /// Whether the error names an id the store does not hold.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::BlueprintNotFound(_) | StoreError::ContractNotFound(_)
        )
    }
}

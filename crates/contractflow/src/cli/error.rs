//! Helpful error types for CLI commands
//!
//! Every error says what went wrong and, where possible, what to try next.

use contractflow_store::{BlueprintId, ContractId, ContractStore, StoreError};
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    // === Common error constructors ===

    pub fn contract_not_found(id: &ContractId, store: &ContractStore) -> Self {
        let known: Vec<&str> = store.contracts().iter().map(|c| c.id().as_str()).collect();
        let err = Self::new(format!("Contract not found: {}", id))
            .with_suggestion("TRY: List contracts: contractflow contracts");
        if known.is_empty() {
            err.with_context("The store holds no contracts (was it started with --no-seed?)")
        } else {
            err.with_context(format!("Known contracts: {}", known.join(", ")))
        }
    }

    pub fn blueprint_not_found(id: &BlueprintId, store: &ContractStore) -> Self {
        let known: Vec<&str> = store.blueprints().iter().map(|b| b.id.as_str()).collect();
        Self::new(format!("Blueprint not found: {}", id))
            .with_context(if known.is_empty() {
                "The catalog is empty".to_string()
            } else {
                format!("Known blueprints: {}", known.join(", "))
            })
            .with_suggestion("TRY: List blueprints: contractflow blueprints")
    }

    pub fn unknown_alias(alias: &str) -> Self {
        Self::new(format!("Unknown alias: @{}", alias))
            .with_context("Aliases are defined by an earlier step's \"alias\" key")
            .with_suggestion("TRY: Check the step order in the script")
    }

    pub fn config_not_found(path: &Path) -> Self {
        Self::new(format!("Config file not found: {}", path.display()))
            .with_context("A config path was given explicitly, so it must exist")
            .with_suggestion("TRY: Drop --config (or unset CONTRACTFLOW_CONFIG) to use defaults")
    }

    pub fn script_parse_error(path: &Path, details: &str) -> Self {
        Self::new(format!("Cannot parse script: {}", details))
            .with_context(format!("Failed to read steps from {}", path.display()))
            .with_suggestion("TRY: A script is a JSON array of objects with an \"op\" key")
            .with_suggestion(
                "TRY: Valid ops: add_blueprint, create_contract, set_status, update_values, sign",
            )
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Turn unknown-id store errors into suggestions; pass the rest through.
pub fn explain_store_error(err: StoreError, store: &ContractStore) -> anyhow::Error {
    match err {
        StoreError::ContractNotFound(id) => HelpfulError::contract_not_found(&id, store).into(),
        StoreError::BlueprintNotFound(id) => HelpfulError::blueprint_not_found(&id, store).into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_layout() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While signing")
            .with_suggestion("TRY: again");

        let display = err.to_string();
        assert!(display.starts_with("ERROR: Something went wrong\n"));
        assert!(display.contains("CONTEXT: While signing"));
        assert!(display.contains("  TRY: again"));
    }

    #[test]
    fn test_contract_not_found_lists_known_ids() {
        let store = ContractStore::seeded().unwrap();
        let err = HelpfulError::contract_not_found(&ContractId::from_static("ct_9"), &store);
        let display = err.to_string();
        assert!(display.contains("ct_9"));
        assert!(display.contains("ct_1, ct_2"));

        let empty = ContractStore::new();
        let err = HelpfulError::contract_not_found(&ContractId::from_static("ct_9"), &empty);
        assert!(err.to_string().contains("--no-seed"));
    }
}

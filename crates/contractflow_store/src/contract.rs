//! Contract Types
//!
//! A contract is one document instantiated from a blueprint. It carries field
//! values and a lifecycle; both only change through [`crate::ContractStore`].

use crate::blueprint::Blueprint;
use crate::field::{FieldValue, FieldValues};
use chrono::{DateTime, Utc};
use contractflow_ids::{BlueprintId, ContractId, FieldId};
use contractflow_lifecycle::{
    ContractAction, ContractStatus, Lifecycle, StatusChange, TransitionError, TransitionOutcome,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A contract instance bound to one blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    id: ContractId,
    blueprint_id: BlueprintId,
    /// Copy of the blueprint name at creation time
    blueprint_name: String,
    name: String,
    #[serde(flatten)]
    lifecycle: Lifecycle,
    #[serde(default)]
    values: FieldValues,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Contract {
    pub(crate) fn new(
        id: ContractId,
        blueprint: &Blueprint,
        name: String,
        values: FieldValues,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            blueprint_id: blueprint.id.clone(),
            blueprint_name: blueprint.name.clone(),
            name,
            lifecycle: Lifecycle::begin(now),
            values,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a contract from recorded parts (sample data, injected state).
    pub(crate) fn from_parts(
        id: ContractId,
        blueprint: &Blueprint,
        name: impl Into<String>,
        lifecycle: Lifecycle,
        values: FieldValues,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            blueprint_id: blueprint.id.clone(),
            blueprint_name: blueprint.name.clone(),
            name: name.into(),
            created_at: lifecycle.created_at(),
            lifecycle,
            values,
            updated_at,
        }
    }

    pub fn id(&self) -> &ContractId {
        &self.id
    }

    pub fn blueprint_id(&self) -> &BlueprintId {
        &self.blueprint_id
    }

    pub fn blueprint_name(&self) -> &str {
        &self.blueprint_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ContractStatus {
        self.lifecycle.status()
    }

    pub fn history(&self) -> &[StatusChange] {
        self.lifecycle.history()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn value(&self, field: &FieldId) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether field values may still be edited.
    pub fn is_editable(&self) -> bool {
        self.status().accepts_value_edits()
    }

    pub fn available_actions(&self) -> &'static [ContractAction] {
        self.status().available_actions()
    }

    /// Describe the first broken invariant, if any.
    pub(crate) fn consistency_problem(&self) -> Option<String> {
        if self.created_at != self.lifecycle.created_at() {
            return Some("created_at differs from the first history entry".to_string());
        }
        if self.updated_at < self.created_at {
            return Some("updated_at precedes created_at".to_string());
        }
        None
    }

    pub(crate) fn apply_transition(
        &mut self,
        to: ContractStatus,
        now: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let outcome = self.lifecycle.transition(to, now, note)?;
        if outcome.is_applied() {
            self.touch(now);
        }
        Ok(outcome)
    }

    /// Shallow merge: each submitted key replaces the stored value.
    pub(crate) fn merge_values(&mut self, partial: FieldValues, now: DateTime<Utc>) {
        self.values.extend(partial);
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at);
    }
}

// ============================================================================
// Listing filters and counters
// ============================================================================

/// Dashboard tabs for narrowing the contract list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractFilter {
    #[default]
    All,
    /// created, approved, or sent
    Active,
    /// signed or locked
    Signed,
    /// sent and awaiting signature
    Pending,
}

impl ContractFilter {
    pub fn matches(&self, status: ContractStatus) -> bool {
        match self {
            ContractFilter::All => true,
            ContractFilter::Active => matches!(
                status,
                ContractStatus::Created | ContractStatus::Approved | ContractStatus::Sent
            ),
            ContractFilter::Signed => {
                matches!(status, ContractStatus::Signed | ContractStatus::Locked)
            }
            ContractFilter::Pending => status == ContractStatus::Sent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractFilter::All => "all",
            ContractFilter::Active => "active",
            ContractFilter::Signed => "signed",
            ContractFilter::Pending => "pending",
        }
    }
}

impl fmt::Display for ContractFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContractFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ContractFilter::All),
            "active" => Ok(ContractFilter::Active),
            "signed" => Ok(ContractFilter::Signed),
            "pending" => Ok(ContractFilter::Pending),
            other => Err(format!("unknown contract filter: {}", other)),
        }
    }
}

/// Headline counts shown above the contract list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStats {
    pub total: usize,
    pub active: usize,
    /// Contracts whose status is exactly `signed` (locked ones are not counted)
    pub signed: usize,
    pub pending: usize,
}

impl ContractStats {
    pub fn from_contracts<'a>(contracts: impl IntoIterator<Item = &'a Contract>) -> Self {
        let mut stats = ContractStats::default();
        for contract in contracts {
            let status = contract.status();
            stats.total += 1;
            if ContractFilter::Active.matches(status) {
                stats.active += 1;
            }
            if status == ContractStatus::Signed {
                stats.signed += 1;
            }
            if ContractFilter::Pending.matches(status) {
                stats.pending += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDefinition, FieldType};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn blueprint() -> Blueprint {
        Blueprint {
            id: BlueprintId::from_static("bp_t"),
            name: "Consulting".into(),
            description: "Consulting engagement".into(),
            fields: vec![FieldDefinition::required(
                FieldId::from_static("f_1"),
                FieldType::Text,
                "Client",
            )],
            created_at: now(),
        }
    }

    fn contract() -> Contract {
        Contract::new(
            ContractId::from_static("ct_t"),
            &blueprint(),
            "Consulting - Q3".into(),
            FieldValues::new(),
            now(),
        )
    }

    #[test]
    fn test_new_contract_starts_created() {
        let c = contract();
        assert_eq!(c.status(), ContractStatus::Created);
        assert_eq!(c.history().len(), 1);
        assert_eq!(c.created_at(), c.updated_at());
        assert_eq!(c.blueprint_name(), "Consulting");
        assert!(c.consistency_problem().is_none());
    }

    #[test]
    fn test_merge_overwrites_only_given_keys() {
        let mut c = contract();
        let f1 = FieldId::from_static("f_1");
        let f2 = FieldId::from_static("f_2");
        c.merge_values(
            FieldValues::from([(f1.clone(), "a".into()), (f2.clone(), "b".into())]),
            now(),
        );
        c.merge_values(FieldValues::from([(f1.clone(), "z".into())]), now() + Duration::minutes(1));

        assert_eq!(c.value(&f1), Some(&FieldValue::text("z")));
        assert_eq!(c.value(&f2), Some(&FieldValue::text("b")));
        assert_eq!(c.updated_at(), now() + Duration::minutes(1));
    }

    #[test]
    fn test_updated_at_never_moves_back() {
        let mut c = contract();
        c.merge_values(FieldValues::new(), now() - Duration::days(1));
        assert_eq!(c.updated_at(), now());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(contract()).unwrap();
        assert_eq!(json["status"], "created");
        assert_eq!(json["history"][0]["status"], "created");
        assert_eq!(json["blueprint_name"], "Consulting");

        let back: Contract = serde_json::from_value(json).unwrap();
        assert_eq!(back, contract());
    }

    #[test]
    fn test_filters() {
        assert!(ContractFilter::Active.matches(ContractStatus::Sent));
        assert!(!ContractFilter::Active.matches(ContractStatus::Signed));
        assert!(ContractFilter::Signed.matches(ContractStatus::Locked));
        assert!(ContractFilter::Pending.matches(ContractStatus::Sent));
        assert!(!ContractFilter::Pending.matches(ContractStatus::Approved));
        assert_eq!("Pending".parse::<ContractFilter>(), Ok(ContractFilter::Pending));
        assert!("archived".parse::<ContractFilter>().is_err());
    }
}

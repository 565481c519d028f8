//! Contract lifecycle core types and state machine.
//!
//! Canonical definitions for ContractStatus, ContractAction, the audit
//! history entry, and the transition table every contract moves through.
//!
//! ```text
//! created -> approved -> sent -> signed -> locked
//!    \__________\__________\______\_____-> revoked
//! ```
//!
//! `locked` and `revoked` are terminal. A transition request from a terminal
//! state is a no-op, not an error; every other request outside the table is
//! rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Contract Status - The core state machine
// ============================================================================

/// Lifecycle status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    /// Reserved for pre-creation staging. No operation produces it today.
    Draft,
    /// Instantiated from a blueprint, awaiting approval
    Created,
    /// Approved internally, ready to go out
    Approved,
    /// Sent to the counterparty for signature
    Sent,
    /// Signature recorded. Values are frozen from here on.
    Signed,
    /// Terminal: archived record
    Locked,
    /// Terminal: withdrawn
    Revoked,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 7] = [
        ContractStatus::Draft,
        ContractStatus::Created,
        ContractStatus::Approved,
        ContractStatus::Sent,
        ContractStatus::Signed,
        ContractStatus::Locked,
        ContractStatus::Revoked,
    ];

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Created => "created",
            ContractStatus::Approved => "approved",
            ContractStatus::Sent => "sent",
            ContractStatus::Signed => "signed",
            ContractStatus::Locked => "locked",
            ContractStatus::Revoked => "revoked",
        }
    }

    /// Human-readable label for badges and listings.
    pub fn label(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "Draft",
            ContractStatus::Created => "Created",
            ContractStatus::Approved => "Approved",
            ContractStatus::Sent => "Sent for Signature",
            ContractStatus::Signed => "Signed",
            ContractStatus::Locked => "Locked",
            ContractStatus::Revoked => "Revoked",
        }
    }

    /// Check if this is a terminal state (no outgoing transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContractStatus::Locked | ContractStatus::Revoked)
    }

    /// Whether field values may still be edited in this state.
    pub fn accepts_value_edits(&self) -> bool {
        !matches!(
            self,
            ContractStatus::Signed | ContractStatus::Locked | ContractStatus::Revoked
        )
    }

    /// Get valid transitions from this state.
    pub fn valid_transitions(&self) -> &'static [ContractStatus] {
        match self {
            ContractStatus::Draft => &[ContractStatus::Created],
            ContractStatus::Created => &[ContractStatus::Approved, ContractStatus::Revoked],
            ContractStatus::Approved => &[ContractStatus::Sent, ContractStatus::Revoked],
            ContractStatus::Sent => &[ContractStatus::Signed, ContractStatus::Revoked],
            ContractStatus::Signed => &[ContractStatus::Locked, ContractStatus::Revoked],
            ContractStatus::Locked | ContractStatus::Revoked => &[],
        }
    }

    /// Check if a transition to the target state is valid.
    pub fn can_transition_to(&self, target: ContractStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Actions a user can take from this state, in display order.
    pub fn available_actions(&self) -> &'static [ContractAction] {
        match self {
            ContractStatus::Created => &[ContractAction::Approve, ContractAction::Revoke],
            ContractStatus::Approved => &[ContractAction::Send, ContractAction::Revoke],
            ContractStatus::Sent => &[ContractAction::Sign, ContractAction::Revoke],
            ContractStatus::Signed => &[ContractAction::Lock, ContractAction::Revoke],
            ContractStatus::Draft | ContractStatus::Locked | ContractStatus::Revoked => &[],
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when parsing a status or action from string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl std::str::FromStr for ContractStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError {
                kind: "status",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Contract Action - User-facing triggers
// ============================================================================

/// An explicit user action that drives one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractAction {
    Approve,
    Send,
    Sign,
    Lock,
    Revoke,
}

impl ContractAction {
    pub const ALL: [ContractAction; 5] = [
        ContractAction::Approve,
        ContractAction::Send,
        ContractAction::Sign,
        ContractAction::Lock,
        ContractAction::Revoke,
    ];

    /// The status this action moves a contract into.
    pub fn target(&self) -> ContractStatus {
        match self {
            ContractAction::Approve => ContractStatus::Approved,
            ContractAction::Send => ContractStatus::Sent,
            ContractAction::Sign => ContractStatus::Signed,
            ContractAction::Lock => ContractStatus::Locked,
            ContractAction::Revoke => ContractStatus::Revoked,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractAction::Approve => "approve",
            ContractAction::Send => "send",
            ContractAction::Sign => "sign",
            ContractAction::Lock => "lock",
            ContractAction::Revoke => "revoke",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContractAction::Approve => "Approve",
            ContractAction::Send => "Send for Signature",
            ContractAction::Sign => "Sign Contract",
            ContractAction::Lock => "Lock Record",
            ContractAction::Revoke => "Revoke",
        }
    }
}

impl fmt::Display for ContractAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContractAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractAction::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError {
                kind: "action",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// History
// ============================================================================

/// One audit trail entry: the status a contract entered and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ContractStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StatusChange {
    pub fn new(status: ContractStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            status,
            timestamp,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// ============================================================================
// Transition results
// ============================================================================

/// Errors for state machine operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ContractStatus,
        to: ContractStatus,
    },
}

/// Result of checking a requested transition without applying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    /// The transition is in the table and may be applied.
    Allowed,
    /// The contract is terminal; the request must be ignored.
    Frozen,
}

/// What a successful transition request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied {
        from: ContractStatus,
        to: ContractStatus,
    },
    /// Frozen contract, nothing changed.
    Unchanged { status: ContractStatus },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied { .. })
    }

    /// Status after the request, applied or not.
    pub fn status(&self) -> ContractStatus {
        match self {
            TransitionOutcome::Applied { to, .. } => *to,
            TransitionOutcome::Unchanged { status } => *status,
        }
    }
}

/// Errors raised when rebuilding a lifecycle from a recorded history.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleHistoryError {
    #[error("history is empty")]
    Empty,

    #[error("history must start with created, found {0}")]
    FirstNotCreated(ContractStatus),

    #[error("history entry {index} records illegal transition from {from} to {to}")]
    IllegalStep {
        index: usize,
        from: ContractStatus,
        to: ContractStatus,
    },

    #[error("history entry {index} is older than the entry before it")]
    OutOfOrder { index: usize },

    #[error("status {status} does not match last history entry {last}")]
    StatusMismatch {
        status: ContractStatus,
        last: ContractStatus,
    },
}

// ============================================================================
// Lifecycle - status plus its append-only history
// ============================================================================

/// Current status together with the audit trail that produced it.
///
/// The fields are private: the only way to change either is [`Lifecycle::transition`],
/// which appends exactly one entry and moves the status in the same step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LifecycleRecord", into = "LifecycleRecord")]
pub struct Lifecycle {
    status: ContractStatus,
    history: Vec<StatusChange>,
}

#[derive(Serialize, Deserialize)]
struct LifecycleRecord {
    status: ContractStatus,
    history: Vec<StatusChange>,
}

impl Lifecycle {
    /// Start a new lifecycle in `created` at the given instant.
    pub fn begin(at: DateTime<Utc>) -> Self {
        Self {
            status: ContractStatus::Created,
            history: vec![StatusChange::new(ContractStatus::Created, at)],
        }
    }

    /// Rebuild a lifecycle from a recorded history. The status is the fold
    /// of the history, so it always equals the last entry.
    pub fn from_history(history: Vec<StatusChange>) -> Result<Self, LifecycleHistoryError> {
        let first = history.first().ok_or(LifecycleHistoryError::Empty)?;
        if first.status != ContractStatus::Created {
            return Err(LifecycleHistoryError::FirstNotCreated(first.status));
        }

        for (index, pair) in history.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if !prev.status.can_transition_to(next.status) {
                return Err(LifecycleHistoryError::IllegalStep {
                    index: index + 1,
                    from: prev.status,
                    to: next.status,
                });
            }
            if next.timestamp < prev.timestamp {
                return Err(LifecycleHistoryError::OutOfOrder { index: index + 1 });
            }
        }

        let status = history
            .last()
            .map(|entry| entry.status)
            .unwrap_or(ContractStatus::Created);
        Ok(Self { status, history })
    }

    pub fn status(&self) -> ContractStatus {
        self.status
    }

    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    /// Timestamp of the `created` entry.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.history[0].timestamp
    }

    /// Timestamp of the most recent entry.
    pub fn last_changed_at(&self) -> DateTime<Utc> {
        self.history[self.history.len() - 1].timestamp
    }

    pub fn is_frozen(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check a transition without applying it.
    pub fn check(&self, to: ContractStatus) -> Result<TransitionCheck, TransitionError> {
        if self.status.is_terminal() {
            return Ok(TransitionCheck::Frozen);
        }
        if !self.status.can_transition_to(to) {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(TransitionCheck::Allowed)
    }

    /// Attempt to transition to a new state.
    ///
    /// The recorded timestamp is clamped so the history never runs backwards.
    pub fn transition(
        &mut self,
        to: ContractStatus,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<TransitionOutcome, TransitionError> {
        match self.check(to)? {
            TransitionCheck::Frozen => Ok(TransitionOutcome::Unchanged {
                status: self.status,
            }),
            TransitionCheck::Allowed => {
                let from = self.status;
                let at = at.max(self.last_changed_at());
                self.history.push(StatusChange {
                    status: to,
                    timestamp: at,
                    note,
                });
                self.status = to;
                Ok(TransitionOutcome::Applied { from, to })
            }
        }
    }
}

impl TryFrom<LifecycleRecord> for Lifecycle {
    type Error = LifecycleHistoryError;

    fn try_from(record: LifecycleRecord) -> Result<Self, Self::Error> {
        let lifecycle = Lifecycle::from_history(record.history)?;
        if lifecycle.status != record.status {
            return Err(LifecycleHistoryError::StatusMismatch {
                status: record.status,
                last: lifecycle.status,
            });
        }
        Ok(lifecycle)
    }
}

impl From<Lifecycle> for LifecycleRecord {
    fn from(lifecycle: Lifecycle) -> Self {
        Self {
            status: lifecycle.status,
            history: lifecycle.history,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_status_roundtrip() {
        for status in ContractStatus::ALL {
            let parsed: ContractStatus = status.as_str().parse().unwrap();
            assert_eq!(status, parsed);
        }
        assert!("pending".parse::<ContractStatus>().is_err());
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let encoded = serde_json::to_string(&ContractStatus::Sent).unwrap();
        assert_eq!(encoded, "\"sent\"");
    }

    #[test]
    fn test_terminal_detection() {
        assert!(ContractStatus::Locked.is_terminal());
        assert!(ContractStatus::Revoked.is_terminal());
        assert!(!ContractStatus::Signed.is_terminal());
        assert!(!ContractStatus::Created.is_terminal());
    }

    #[test]
    fn test_value_edit_freeze() {
        assert!(ContractStatus::Created.accepts_value_edits());
        assert!(ContractStatus::Sent.accepts_value_edits());
        assert!(!ContractStatus::Signed.accepts_value_edits());
        assert!(!ContractStatus::Locked.accepts_value_edits());
        assert!(!ContractStatus::Revoked.accepts_value_edits());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(ContractStatus::Created.can_transition_to(ContractStatus::Approved));
        assert!(ContractStatus::Signed.can_transition_to(ContractStatus::Revoked));
        assert!(!ContractStatus::Created.can_transition_to(ContractStatus::Signed));
        assert!(!ContractStatus::Approved.can_transition_to(ContractStatus::Approved));
        assert!(!ContractStatus::Sent.can_transition_to(ContractStatus::Draft));
        assert!(ContractStatus::Locked.valid_transitions().is_empty());
    }

    #[test]
    fn test_no_transition_produces_draft() {
        for status in ContractStatus::ALL {
            assert!(!status.can_transition_to(ContractStatus::Draft));
        }
    }

    #[test]
    fn test_available_actions_follow_table() {
        for status in ContractStatus::ALL {
            for action in status.available_actions() {
                assert!(status.can_transition_to(action.target()));
            }
        }
        assert_eq!(
            ContractStatus::Sent.available_actions(),
            &[ContractAction::Sign, ContractAction::Revoke]
        );
        assert!(ContractStatus::Revoked.available_actions().is_empty());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("Revoke".parse::<ContractAction>().unwrap(), ContractAction::Revoke);
        assert!("delete".parse::<ContractAction>().is_err());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut lc = Lifecycle::begin(t0());
        assert_eq!(lc.status(), ContractStatus::Created);

        let outcome = lc
            .transition(ContractStatus::Approved, t0() + Duration::hours(1), None)
            .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Applied {
                from: ContractStatus::Created,
                to: ContractStatus::Approved
            }
        );
        assert_eq!(lc.history().len(), 2);
        assert_eq!(lc.history()[1].status, ContractStatus::Approved);
    }

    #[test]
    fn test_lifecycle_invalid_transition() {
        let mut lc = Lifecycle::begin(t0());
        let result = lc.transition(ContractStatus::Signed, t0(), None);
        assert!(matches!(
            result,
            Err(TransitionError::InvalidTransition { .. })
        ));
        assert_eq!(lc.status(), ContractStatus::Created);
        assert_eq!(lc.history().len(), 1);
    }

    #[test]
    fn test_lifecycle_frozen_is_noop() {
        let mut lc = Lifecycle::begin(t0());
        lc.transition(ContractStatus::Revoked, t0(), None).unwrap();
        let before = lc.clone();

        let outcome = lc
            .transition(ContractStatus::Locked, t0() + Duration::days(1), None)
            .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Unchanged {
                status: ContractStatus::Revoked
            }
        );
        assert_eq!(lc, before);
    }

    #[test]
    fn test_lifecycle_clamps_backwards_clock() {
        let mut lc = Lifecycle::begin(t0());
        lc.transition(ContractStatus::Approved, t0() - Duration::hours(3), None)
            .unwrap();
        assert_eq!(lc.last_changed_at(), t0());
    }

    #[test]
    fn test_lifecycle_note_recorded() {
        let mut lc = Lifecycle::begin(t0());
        lc.transition(ContractStatus::Revoked, t0(), Some("client withdrew".into()))
            .unwrap();
        assert_eq!(lc.history()[1].note.as_deref(), Some("client withdrew"));
    }

    #[test]
    fn test_from_history_rejects_bad_records() {
        assert_eq!(
            Lifecycle::from_history(vec![]),
            Err(LifecycleHistoryError::Empty)
        );
        assert_eq!(
            Lifecycle::from_history(vec![StatusChange::new(ContractStatus::Sent, t0())]),
            Err(LifecycleHistoryError::FirstNotCreated(ContractStatus::Sent))
        );
        let skip = vec![
            StatusChange::new(ContractStatus::Created, t0()),
            StatusChange::new(ContractStatus::Signed, t0()),
        ];
        assert!(matches!(
            Lifecycle::from_history(skip),
            Err(LifecycleHistoryError::IllegalStep { index: 1, .. })
        ));
        let backwards = vec![
            StatusChange::new(ContractStatus::Created, t0()),
            StatusChange::new(ContractStatus::Approved, t0() - Duration::seconds(1)),
        ];
        assert_eq!(
            Lifecycle::from_history(backwards),
            Err(LifecycleHistoryError::OutOfOrder { index: 1 })
        );
    }

    #[test]
    fn test_deserialize_checks_status_against_history() {
        let json = serde_json::json!({
            "status": "approved",
            "history": [{ "status": "created", "timestamp": "2024-05-01T09:00:00Z" }]
        });
        let err = serde_json::from_value::<Lifecycle>(json).unwrap_err();
        assert!(err.to_string().contains("does not match"));

        let ok = serde_json::json!({
            "status": "approved",
            "history": [
                { "status": "created", "timestamp": "2024-05-01T09:00:00Z" },
                { "status": "approved", "timestamp": "2024-05-02T09:00:00Z", "note": "ok" }
            ]
        });
        let lc: Lifecycle = serde_json::from_value(ok).unwrap();
        assert_eq!(lc.status(), ContractStatus::Approved);
        assert_eq!(lc.created_at(), t0());
    }
}

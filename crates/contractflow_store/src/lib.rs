//! Blueprint Catalog and Contract Store
//!
//! # Philosophy: Blueprint = Shape, Contract = Instance
//!
//! 1. **Blueprint**: A reusable template listing typed fields (text, date,
//!    signature, checkbox, number)
//! 2. **Contract**: One document created from a blueprint, holding values
//!    for those fields
//! 3. **Lifecycle**: Every contract walks created -> approved -> sent ->
//!    signed -> locked, or drops out to revoked
//!
//! Signed, locked, and revoked contracts no longer accept value edits.
//! Locked and revoked contracts no longer accept status changes. Requests
//! against those states are reported as unchanged rather than failing.
//!
//! # Modules
//!
//! - [`field`]: Field types, definitions, and value shapes
//! - [`blueprint`]: Blueprints and the draft form that produces them
//! - [`contract`]: Contract instances, list filters, and counters
//! - [`validation`]: Required-field and value-type checks
//! - [`store`]: The [`ContractStore`] owning both collections
//! - [`seed`]: Built-in sample catalog

pub mod blueprint;
pub mod clock;
pub mod config;
pub mod contract;
pub mod error;
pub mod events;
pub mod field;
pub mod seed;
pub mod store;
pub mod validation;

pub use blueprint::{Blueprint, BlueprintDraft, BlueprintDraftError, DraftIssue};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use contract::{Contract, ContractFilter, ContractStats};
pub use error::StoreError;
pub use events::{StoreEvent, SubscriptionId};
pub use field::{FieldDefinition, FieldType, FieldValue, FieldValueError, FieldValues};
pub use store::{ContractStore, StoreState, ValuesOutcome};
pub use validation::{validate_required, validate_values, ValidationError};

// Re-export lifecycle and id types that appear in the store API
pub use contractflow_ids::{BlueprintId, ContractId, FieldId};
pub use contractflow_lifecycle::{
    ContractAction, ContractStatus, StatusChange, TransitionError, TransitionOutcome,
};

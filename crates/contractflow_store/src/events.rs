//! Change notifications emitted by the store.

use contractflow_ids::{BlueprintId, ContractId, FieldId};
use contractflow_lifecycle::ContractStatus;
use serde::Serialize;

/// Handle returned by [`crate::ContractStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// A mutation that was applied. No-ops and rejected requests emit nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    BlueprintAdded {
        blueprint_id: BlueprintId,
    },
    ContractCreated {
        contract_id: ContractId,
        blueprint_id: BlueprintId,
    },
    StatusChanged {
        contract_id: ContractId,
        from: ContractStatus,
        to: ContractStatus,
    },
    ValuesUpdated {
        contract_id: ContractId,
        fields: Vec<FieldId>,
    },
}

//! The contract store: blueprint catalog, contract instances, and the only
//! mutation surface for both.
//!
//! Every mutation takes `&mut self` and either applies completely (including
//! the history append) or leaves the store untouched. Callers hold the store
//! directly; there is no ambient instance.

use crate::blueprint::{Blueprint, BlueprintDraft};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::contract::{Contract, ContractFilter, ContractStats};
use crate::error::StoreError;
use crate::events::{StoreEvent, SubscriptionId};
use crate::field::{FieldDefinition, FieldValue, FieldValues};
use crate::seed;
use crate::validation::{validate_required, validate_values};
use contractflow_ids::{BlueprintId, ContractId, FieldId};
use contractflow_lifecycle::{ContractAction, ContractStatus, TransitionCheck, TransitionOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

type Subscriber = Box<dyn FnMut(&StoreEvent) + Send>;

/// Initial contents handed to [`ContractStore::with_state`]. Both lists are
/// most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub blueprints: Vec<Blueprint>,
    pub contracts: Vec<Contract>,
}

/// What a value update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuesOutcome {
    Applied,
    /// The contract is signed, locked, or revoked; nothing changed.
    Unchanged { status: ContractStatus },
}

impl ValuesOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ValuesOutcome::Applied)
    }
}

/// In-memory blueprint catalog and contract store.
pub struct ContractStore {
    blueprints: Vec<Blueprint>,
    contracts: Vec<Contract>,
    clock: Box<dyn Clock>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for ContractStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractStore")
            .field("blueprints", &self.blueprints.len())
            .field("contracts", &self.contracts.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for ContractStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractStore {
    /// An empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// An empty store on the given clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            blueprints: Vec::new(),
            contracts: Vec::new(),
            clock: Box::new(clock),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// A store holding `state`, after checking that it satisfies every
    /// invariant the mutation operations maintain.
    pub fn with_state(state: StoreState, clock: impl Clock + 'static) -> Result<Self, StoreError> {
        check_state(&state)?;
        let mut store = Self::with_clock(clock);
        store.blueprints = state.blueprints;
        store.contracts = state.contracts;
        Ok(store)
    }

    /// A store pre-loaded with the sample catalog on the system clock.
    pub fn seeded() -> Result<Self, StoreError> {
        Self::seeded_with_clock(SystemClock)
    }

    pub fn seeded_with_clock(clock: impl Clock + 'static) -> Result<Self, StoreError> {
        let state = seed::sample_state(clock.now())?;
        Self::with_state(state, clock)
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.seed_samples {
            let store = Self::seeded()?;
            info!(
                "Seeded store with {} blueprints and {} contracts",
                store.blueprints.len(),
                store.contracts.len()
            );
            Ok(store)
        } else {
            Ok(Self::new())
        }
    }

    // ========================================================================
    // Blueprints
    // ========================================================================

    /// Catalog, most recent first.
    pub fn blueprints(&self) -> &[Blueprint] {
        &self.blueprints
    }

    pub fn get_blueprint(&self, id: &BlueprintId) -> Result<&Blueprint, StoreError> {
        self.blueprints
            .iter()
            .find(|b| &b.id == id)
            .ok_or_else(|| StoreError::BlueprintNotFound(id.clone()))
    }

    /// Add a blueprint to the head of the catalog.
    ///
    /// Only the non-empty field list is enforced here; label and field-id
    /// rules belong to [`BlueprintDraft::validate`].
    pub fn add_blueprint(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        fields: Vec<FieldDefinition>,
    ) -> Result<Blueprint, StoreError> {
        if fields.is_empty() {
            return Err(StoreError::EmptyBlueprint);
        }

        let blueprint = Blueprint {
            id: self.fresh_blueprint_id(),
            name: name.into(),
            description: description.into(),
            fields,
            created_at: self.clock.now(),
        };
        debug!(blueprint_id = %blueprint.id, fields = blueprint.fields.len(), "blueprint added");

        self.blueprints.insert(0, blueprint.clone());
        self.notify(StoreEvent::BlueprintAdded {
            blueprint_id: blueprint.id.clone(),
        });
        Ok(blueprint)
    }

    /// Validate a draft from the blueprint form, then add it.
    pub fn define_blueprint(&mut self, draft: BlueprintDraft) -> Result<Blueprint, StoreError> {
        draft.validate()?;
        self.add_blueprint(draft.name, draft.description, draft.fields)
    }

    // ========================================================================
    // Contracts
    // ========================================================================

    /// All contracts, most recent first.
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn get_contract(&self, id: &ContractId) -> Result<&Contract, StoreError> {
        self.contracts
            .iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| StoreError::ContractNotFound(id.clone()))
    }

    pub fn find_contracts(&self, filter: ContractFilter) -> impl Iterator<Item = &Contract> {
        self.contracts
            .iter()
            .filter(move |c| filter.matches(c.status()))
    }

    pub fn stats(&self) -> ContractStats {
        ContractStats::from_contracts(&self.contracts)
    }

    /// Instantiate a contract from a blueprint.
    ///
    /// Values are checked against the blueprint's field types and every
    /// required field must be set. On any failure nothing is added.
    pub fn create_contract(
        &mut self,
        blueprint_id: &BlueprintId,
        values: FieldValues,
        name: impl Into<String>,
    ) -> Result<ContractId, StoreError> {
        let blueprint = self.get_blueprint(blueprint_id)?;

        let name = name.into();
        if name.trim().is_empty() {
            return Err(StoreError::EmptyContractName);
        }
        validate_values(blueprint, &values)?;
        if let Err(err) = validate_required(blueprint, &values) {
            debug!(blueprint_id = %blueprint_id, missing = ?err.missing_labels, "contract rejected");
            return Err(err.into());
        }

        let id = self.fresh_contract_id();
        let contract = Contract::new(id.clone(), blueprint, name, values, self.clock.now());
        info!("Created contract {} from blueprint {}", id, blueprint_id);

        self.contracts.insert(0, contract);
        self.notify(StoreEvent::ContractCreated {
            contract_id: id.clone(),
            blueprint_id: blueprint_id.clone(),
        });
        Ok(id)
    }

    pub fn update_contract_status(
        &mut self,
        contract_id: &ContractId,
        target: ContractStatus,
    ) -> Result<TransitionOutcome, StoreError> {
        self.update_contract_status_with_note(contract_id, target, None)
    }

    /// Move a contract along the lifecycle.
    ///
    /// Locked and revoked contracts are left unchanged and reported as
    /// [`TransitionOutcome::Unchanged`]. Requests outside the transition table
    /// fail with [`StoreError::Transition`]. Entering `signed` requires the
    /// blueprint's first signature field to be set.
    pub fn update_contract_status_with_note(
        &mut self,
        contract_id: &ContractId,
        target: ContractStatus,
        note: Option<String>,
    ) -> Result<TransitionOutcome, StoreError> {
        let index = self.contract_index(contract_id)?;
        let contract = &self.contracts[index];

        match contract.lifecycle().check(target) {
            Ok(TransitionCheck::Frozen) => {
                debug!(contract_id = %contract_id, status = %contract.status(), requested = %target, "status change ignored on frozen contract");
                return Ok(TransitionOutcome::Unchanged {
                    status: contract.status(),
                });
            }
            Err(err) => {
                warn!(contract_id = %contract_id, "{}", err);
                return Err(err.into());
            }
            Ok(TransitionCheck::Allowed) => {}
        }

        if target == ContractStatus::Signed {
            self.ensure_signed_field(contract)?;
        }

        let now = self.clock.now();
        let outcome = self.contracts[index].apply_transition(target, now, note)?;
        if let TransitionOutcome::Applied { from, to } = outcome {
            info!("Contract {} moved from {} to {}", contract_id, from, to);
            self.notify(StoreEvent::StatusChanged {
                contract_id: contract_id.clone(),
                from,
                to,
            });
        }
        Ok(outcome)
    }

    /// Perform a user action such as approve or revoke.
    pub fn apply_action(
        &mut self,
        contract_id: &ContractId,
        action: ContractAction,
    ) -> Result<TransitionOutcome, StoreError> {
        self.update_contract_status(contract_id, action.target())
    }

    /// Shallow-merge `partial` into a contract's values.
    ///
    /// Signed, locked, and revoked contracts are left unchanged and reported
    /// as [`ValuesOutcome::Unchanged`]. No history entry is written.
    pub fn update_contract_values(
        &mut self,
        contract_id: &ContractId,
        partial: FieldValues,
    ) -> Result<ValuesOutcome, StoreError> {
        let index = self.contract_index(contract_id)?;
        let contract = &self.contracts[index];

        if !contract.is_editable() {
            debug!(contract_id = %contract_id, status = %contract.status(), "value edit ignored on frozen contract");
            return Ok(ValuesOutcome::Unchanged {
                status: contract.status(),
            });
        }

        let blueprint = self.get_blueprint(contract.blueprint_id())?;
        validate_values(blueprint, &partial)?;

        let fields: Vec<FieldId> = partial.keys().cloned().collect();
        let now = self.clock.now();
        self.contracts[index].merge_values(partial, now);
        debug!(contract_id = %contract_id, fields = fields.len(), "contract values updated");

        self.notify(StoreEvent::ValuesUpdated {
            contract_id: contract_id.clone(),
            fields,
        });
        Ok(ValuesOutcome::Applied)
    }

    /// Record a signature and move the contract to `signed`.
    ///
    /// The signature goes into the blueprint's first signature field. The
    /// frozen guard and transition table are checked before anything is
    /// written, so a rejected signing leaves the values untouched.
    pub fn sign_contract(
        &mut self,
        contract_id: &ContractId,
        signature: &str,
    ) -> Result<TransitionOutcome, StoreError> {
        let contract = self.get_contract(contract_id)?;
        match contract.lifecycle().check(ContractStatus::Signed)? {
            TransitionCheck::Frozen => {
                return Ok(TransitionOutcome::Unchanged {
                    status: contract.status(),
                })
            }
            TransitionCheck::Allowed => {}
        }
        if signature.trim().is_empty() {
            return Err(StoreError::EmptySignature);
        }

        let signature_field = self
            .get_blueprint(contract.blueprint_id())?
            .first_signature_field()
            .map(|f| f.id.clone());
        if let Some(field) = signature_field {
            let values = FieldValues::from([(field, FieldValue::text(signature))]);
            self.update_contract_values(contract_id, values)?;
        }

        self.update_contract_status(contract_id, ContractStatus::Signed)
    }

    // ========================================================================
    // Subscribers
    // ========================================================================

    /// Register a callback invoked after every applied mutation.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&StoreEvent) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event);
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn contract_index(&self, id: &ContractId) -> Result<usize, StoreError> {
        self.contracts
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| StoreError::ContractNotFound(id.clone()))
    }

    fn ensure_signed_field(&self, contract: &Contract) -> Result<(), StoreError> {
        let blueprint = self.get_blueprint(contract.blueprint_id())?;
        if let Some(field) = blueprint.first_signature_field() {
            let signed = contract.value(&field.id).map_or(false, |v| v.is_set());
            if !signed {
                return Err(StoreError::MissingSignature {
                    contract: contract.id().clone(),
                    label: field.label.clone(),
                });
            }
        }
        Ok(())
    }

    fn fresh_blueprint_id(&self) -> BlueprintId {
        loop {
            let id = BlueprintId::generate();
            if !self.blueprints.iter().any(|b| b.id == id) {
                return id;
            }
        }
    }

    fn fresh_contract_id(&self) -> ContractId {
        loop {
            let id = ContractId::generate();
            if !self.contracts.iter().any(|c| c.id() == &id) {
                return id;
            }
        }
    }
}

fn check_state(state: &StoreState) -> Result<(), StoreError> {
    let invalid = |msg: String| Err(StoreError::InvalidState(msg));

    let mut blueprint_ids = HashSet::new();
    for blueprint in &state.blueprints {
        if !blueprint_ids.insert(&blueprint.id) {
            return invalid(format!("duplicate blueprint id {}", blueprint.id));
        }
        if blueprint.fields.is_empty() {
            return invalid(format!("blueprint {} has no fields", blueprint.id));
        }
        let mut field_ids = HashSet::new();
        if let Some(dup) = blueprint.fields.iter().find(|f| !field_ids.insert(&f.id)) {
            return invalid(format!(
                "blueprint {} repeats field id {}",
                blueprint.id, dup.id
            ));
        }
    }

    let mut contract_ids = HashSet::new();
    for contract in &state.contracts {
        if !contract_ids.insert(contract.id()) {
            return invalid(format!("duplicate contract id {}", contract.id()));
        }
        let blueprint = state
            .blueprints
            .iter()
            .find(|b| &b.id == contract.blueprint_id())
            .ok_or_else(|| StoreError::BlueprintNotFound(contract.blueprint_id().clone()))?;
        validate_values(blueprint, contract.values())?;
        if let Some(problem) = contract.consistency_problem() {
            return invalid(format!("contract {}: {}", contract.id(), problem));
        }
    }
    Ok(())
}

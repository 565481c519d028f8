//! `contractflow run` - replay a JSON script of store operations
//!
//! A script is a JSON array of steps tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "create_contract", "alias": "acme", "blueprint": "bp_1",
//!    "name": "NDA - Acme", "values": {"f_1": "Acme", "f_5": "pending"}},
//!   {"op": "set_status", "contract": "@acme", "status": "approved"},
//!   {"op": "sign", "contract": "@acme", "signature": "Jane Roe"}
//! ]
//! ```
//!
//! References starting with `@` resolve to an alias bound by an earlier step;
//! anything else is taken as a literal id.

use super::contracts::print_contract_table;
use super::error::{explain_store_error, HelpfulError};
use super::output::print_json;
use anyhow::{Context, Result};
use contractflow_store::{
    BlueprintDraft, BlueprintId, Contract, ContractId, ContractStatus, ContractStore,
    FieldDefinition, FieldValues, StoreError, TransitionOutcome, ValuesOutcome,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Script file (JSON array of steps)
    pub script: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    AddBlueprint {
        #[serde(default)]
        alias: Option<String>,
        name: String,
        description: String,
        fields: Vec<FieldDefinition>,
    },
    CreateContract {
        #[serde(default)]
        alias: Option<String>,
        blueprint: String,
        name: String,
        #[serde(default)]
        values: FieldValues,
    },
    SetStatus {
        contract: String,
        status: ContractStatus,
        #[serde(default)]
        note: Option<String>,
    },
    UpdateValues {
        contract: String,
        values: FieldValues,
    },
    Sign {
        contract: String,
        signature: String,
    },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::AddBlueprint { .. } => "add_blueprint",
            Step::CreateContract { .. } => "create_contract",
            Step::SetStatus { .. } => "set_status",
            Step::UpdateValues { .. } => "update_values",
            Step::Sign { .. } => "sign",
        }
    }
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// 1-based position in the script
    pub step: usize,
    pub op: &'static str,
    pub target: String,
    pub outcome: String,
}

/// Applies steps to a store, tracking aliases across steps.
pub struct ScriptRunner<'a> {
    store: &'a mut ContractStore,
    blueprint_aliases: HashMap<String, BlueprintId>,
    contract_aliases: HashMap<String, ContractId>,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(store: &'a mut ContractStore) -> Self {
        Self {
            store,
            blueprint_aliases: HashMap::new(),
            contract_aliases: HashMap::new(),
        }
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&mut self, steps: Vec<Step>) -> Result<Vec<StepReport>> {
        let mut reports = Vec::with_capacity(steps.len());
        for (index, step) in steps.into_iter().enumerate() {
            let op = step.op();
            let report = self
                .apply(index + 1, step)
                .with_context(|| format!("Step {} ({}) failed", index + 1, op))?;
            info!("step {}: {} {} -> {}", report.step, report.op, report.target, report.outcome);
            reports.push(report);
        }
        Ok(reports)
    }

    fn apply(&mut self, step: usize, request: Step) -> Result<StepReport> {
        let op = request.op();
        let (target, outcome) = match request {
            Step::AddBlueprint {
                alias,
                name,
                description,
                fields,
            } => {
                let draft = BlueprintDraft::new(name, description).with_fields(fields);
                let blueprint = self.store_call(|s| s.define_blueprint(draft))?;
                if let Some(alias) = alias {
                    self.blueprint_aliases.insert(alias, blueprint.id.clone());
                }
                (blueprint.id.to_string(), "added".to_string())
            }
            Step::CreateContract {
                alias,
                blueprint,
                name,
                values,
            } => {
                let blueprint = self.blueprint_ref(&blueprint)?;
                let id = self.store_call(|s| s.create_contract(&blueprint, values, name))?;
                if let Some(alias) = alias {
                    self.contract_aliases.insert(alias, id.clone());
                }
                (id.to_string(), "created".to_string())
            }
            Step::SetStatus {
                contract,
                status,
                note,
            } => {
                let id = self.contract_ref(&contract)?;
                let outcome =
                    self.store_call(|s| s.update_contract_status_with_note(&id, status, note))?;
                (id.to_string(), describe_transition(outcome))
            }
            Step::UpdateValues { contract, values } => {
                let id = self.contract_ref(&contract)?;
                let count = values.len();
                let outcome = self.store_call(|s| s.update_contract_values(&id, values))?;
                let text = match outcome {
                    ValuesOutcome::Applied => format!("updated {} field(s)", count),
                    ValuesOutcome::Unchanged { status } => format!("unchanged ({})", status),
                };
                (id.to_string(), text)
            }
            Step::Sign {
                contract,
                signature,
            } => {
                let id = self.contract_ref(&contract)?;
                let outcome = self.store_call(|s| s.sign_contract(&id, &signature))?;
                (id.to_string(), describe_transition(outcome))
            }
        };
        Ok(StepReport {
            step,
            op,
            target,
            outcome,
        })
    }

    fn store_call<T>(
        &mut self,
        f: impl FnOnce(&mut ContractStore) -> Result<T, StoreError>,
    ) -> Result<T> {
        f(self.store).map_err(|err| explain_store_error(err, self.store))
    }

    fn blueprint_ref(&self, raw: &str) -> Result<BlueprintId> {
        match raw.strip_prefix('@') {
            Some(alias) => self
                .blueprint_aliases
                .get(alias)
                .cloned()
                .ok_or_else(|| HelpfulError::unknown_alias(alias).into()),
            None => Ok(BlueprintId::parse(raw)?),
        }
    }

    fn contract_ref(&self, raw: &str) -> Result<ContractId> {
        match raw.strip_prefix('@') {
            Some(alias) => self
                .contract_aliases
                .get(alias)
                .cloned()
                .ok_or_else(|| HelpfulError::unknown_alias(alias).into()),
            None => Ok(ContractId::parse(raw)?),
        }
    }
}

fn describe_transition(outcome: TransitionOutcome) -> String {
    match outcome {
        TransitionOutcome::Applied { from, to } => format!("{} -> {}", from, to),
        TransitionOutcome::Unchanged { status } => format!("unchanged ({})", status),
    }
}

pub fn parse_script(text: &str) -> serde_json::Result<Vec<Step>> {
    serde_json::from_str(text)
}

#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    steps: Vec<StepReport>,
    contracts: &'a [Contract],
}

pub fn run(args: RunArgs, store: &mut ContractStore) -> Result<()> {
    let text = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script: {}", args.script.display()))?;
    let steps = parse_script(&text)
        .map_err(|err| HelpfulError::script_parse_error(&args.script, &err.to_string()))?;

    let reports = ScriptRunner::new(store).run(steps)?;

    if args.json {
        return print_json(&RunOutput {
            steps: reports,
            contracts: store.contracts(),
        });
    }

    for report in &reports {
        println!(
            "{:>3}. {:<16} {:<16} {}",
            report.step, report.op, report.target, report.outcome
        );
    }
    println!();
    let contracts: Vec<&Contract> = store.contracts().iter().collect();
    print_contract_table(&contracts);
    Ok(())
}

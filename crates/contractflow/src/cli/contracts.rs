//! `contractflow contracts` and `contractflow show`

use super::error::explain_store_error;
use super::output::{format_age, format_timestamp, print_json, status_cell, table};
use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;
use contractflow_store::{Contract, ContractAction, ContractFilter, ContractId, ContractStore};
use serde::Serialize;

#[derive(Debug, clap::Args)]
pub struct ContractsArgs {
    /// Which contracts to list: all, active, signed, pending
    #[arg(long, default_value = "all")]
    pub filter: ContractFilter,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct ShowArgs {
    /// Contract id (e.g. ct_1)
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// A contract plus the actions its current status offers.
#[derive(Debug, Serialize)]
pub struct ContractDetail<'a> {
    #[serde(flatten)]
    pub contract: &'a Contract,
    pub available_actions: &'static [ContractAction],
}

pub fn run_list(args: ContractsArgs, store: &ContractStore) -> Result<()> {
    let contracts: Vec<&Contract> = store.find_contracts(args.filter).collect();
    if args.json {
        return print_json(&contracts);
    }

    if contracts.is_empty() {
        println!("No {} contracts.", args.filter);
        return Ok(());
    }
    print_contract_table(&contracts);
    Ok(())
}

pub fn print_contract_table(contracts: &[&Contract]) {
    let now = Utc::now();
    let mut t = table(&["ID", "NAME", "BLUEPRINT", "STATUS", "UPDATED"]);
    for c in contracts {
        t.add_row(vec![
            Cell::new(c.id()),
            Cell::new(c.name()),
            Cell::new(c.blueprint_name()),
            status_cell(c.status()),
            Cell::new(format_age(c.updated_at(), now)),
        ]);
    }
    println!("{}", t);
}

pub fn run_show(args: ShowArgs, store: &ContractStore) -> Result<()> {
    let id = ContractId::parse(&args.id)?;
    let contract = store
        .get_contract(&id)
        .map_err(|err| explain_store_error(err, store))?;

    if args.json {
        return print_json(&ContractDetail {
            contract,
            available_actions: contract.available_actions(),
        });
    }

    println!("{} ({})", contract.name(), contract.id());
    println!("Blueprint: {} ({})", contract.blueprint_name(), contract.blueprint_id());
    println!("Status:    {}", contract.status().label());
    println!("Created:   {}", format_timestamp(contract.created_at()));
    println!("Updated:   {}", format_timestamp(contract.updated_at()));
    println!();

    let blueprint = store.get_blueprint(contract.blueprint_id())?;
    let mut fields = table(&["FIELD", "TYPE", "REQUIRED", "VALUE"]);
    for field in &blueprint.fields {
        let value = contract
            .value(&field.id)
            .map(|v| v.to_string())
            .unwrap_or_default();
        fields.add_row(vec![
            field.label.clone(),
            field.field_type.to_string(),
            if field.required { "yes" } else { "" }.to_string(),
            value,
        ]);
    }
    println!("{}", fields);

    let mut history = table(&["STATUS", "AT", "NOTE"]);
    for change in contract.history() {
        history.add_row(vec![
            status_cell(change.status),
            Cell::new(format_timestamp(change.timestamp)),
            Cell::new(change.note.as_deref().unwrap_or_default()),
        ]);
    }
    println!("{}", history);

    let actions = contract.available_actions();
    if actions.is_empty() {
        println!("No further actions.");
    } else {
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        println!("Actions: {}", labels.join(", "));
    }
    Ok(())
}

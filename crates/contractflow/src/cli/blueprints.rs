//! `contractflow blueprints` - list the blueprint catalog

use super::output::{format_timestamp, print_json, table};
use anyhow::Result;
use contractflow_store::ContractStore;

#[derive(Debug, clap::Args)]
pub struct BlueprintsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: BlueprintsArgs, store: &ContractStore) -> Result<()> {
    let blueprints = store.blueprints();
    if args.json {
        return print_json(blueprints);
    }

    if blueprints.is_empty() {
        println!("No blueprints.");
        return Ok(());
    }

    let mut t = table(&["ID", "NAME", "FIELDS", "REQUIRED", "SIGNATURES", "CREATED"]);
    for bp in blueprints {
        t.add_row(vec![
            bp.id.to_string(),
            bp.name.clone(),
            bp.fields.len().to_string(),
            bp.required_fields().count().to_string(),
            bp.signature_fields().count().to_string(),
            format_timestamp(bp.created_at),
        ]);
    }
    println!("{}", t);
    Ok(())
}

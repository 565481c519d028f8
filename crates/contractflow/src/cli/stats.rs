//! `contractflow stats` - dashboard counters

use super::output::{print_json, table};
use anyhow::Result;
use contractflow_store::ContractStore;

#[derive(Debug, clap::Args)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StatsArgs, store: &ContractStore) -> Result<()> {
    let stats = store.stats();
    if args.json {
        return print_json(&stats);
    }

    let mut t = table(&["TOTAL", "ACTIVE", "SIGNED", "PENDING"]);
    t.add_row(vec![
        stats.total.to_string(),
        stats.active.to_string(),
        stats.signed.to_string(),
        stats.pending.to_string(),
    ]);
    println!("{}", t);
    Ok(())
}

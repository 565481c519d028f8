//! CLI module for ContractFlow
//!
//! Every command builds on one in-process [`contractflow_store::ContractStore`],
//! seeded from the sample catalog unless `--no-seed` is given.

pub mod blueprints;
pub mod config;
pub mod contracts;
pub mod error;
pub mod output;
pub mod script;
pub mod stats;

//! Store configuration.

use serde::{Deserialize, Serialize};

/// How a store is initialized at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Load the built-in sample blueprints and contracts
    pub seed_samples: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed_samples: true }
    }
}

//! Configuration for the contractflow binary
//!
//! Read from `~/.contractflow/config.toml` unless a path is given. A missing
//! default file means defaults; a missing explicit file is an error.

use super::error::HelpfulError;
use anyhow::{Context, Result};
use contractflow_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: Option<String>,
    /// Also write logs under `~/.contractflow/logs`
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            file: true,
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(contractflow_logging::contractflow_home()?.join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Load from `explicit` if given, otherwise from the default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(HelpfulError::config_not_found(path).into());
                }
                Self::from_file(path)
            }
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

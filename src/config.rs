//! Finder configuration: server view, tiebreaker switches and fuzziness thresholds

use crate::catalog::Server;
use crate::error::FindError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODIFIER_JW_THRESHOLD: f64 = 0.95;
pub const DEFAULT_TOKEN_JW_THRESHOLD: f64 = 0.80;
pub const DEFAULT_MAX_SUBQUERY_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Which server's catalog view to search
    pub server: Server,
    /// Prefer monsters released on NA when everything else ties
    pub na_prio: bool,
    /// Prefer earlier branches of `[...]` OR tokens
    pub ormod_prio: bool,
    pub modifier_jw_threshold: f64,
    pub token_jw_threshold: f64,
    /// Nested subqueries beyond this depth match nothing
    pub max_subquery_depth: usize,
    /// Append first-seen unknown modifiers to this file
    pub typo_log_path: Option<PathBuf>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            server: Server::Combined,
            na_prio: true,
            ormod_prio: false,
            modifier_jw_threshold: DEFAULT_MODIFIER_JW_THRESHOLD,
            token_jw_threshold: DEFAULT_TOKEN_JW_THRESHOLD,
            max_subquery_depth: DEFAULT_MAX_SUBQUERY_DEPTH,
            typo_log_path: None,
        }
    }
}

impl FinderConfig {
    pub fn validate(&self) -> Result<(), FindError> {
        for (name, value) in [
            ("modifier_jw_threshold", self.modifier_jw_threshold),
            ("token_jw_threshold", self.token_jw_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FindError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Get the path to the finder configuration file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Cannot determine config directory")?;

    Ok(config_dir.join("find-monster").join("config.json"))
}

/// Load the configuration from the default location
pub fn load_config() -> Result<FinderConfig> {
    load_config_from(&config_path()?)
}

/// Load the configuration from a file; a missing file yields defaults
pub fn load_config_from(path: &Path) -> Result<FinderConfig> {
    if !path.exists() {
        return Ok(FinderConfig::default());
    }

    let data = fs::read_to_string(path).context("Failed to read config file")?;

    let config: FinderConfig =
        serde_json::from_str(&data).context("Failed to parse config file")?;

    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &FinderConfig) -> Result<()> {
    save_config_to(config, &config_path()?)
}

pub fn save_config_to(config: &FinderConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let data = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, data).context("Failed to write config file")?;

    Ok(())
}

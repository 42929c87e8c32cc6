// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration management for the tally binary.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. `<config dir>/tally/config.toml`
//! 3. `tally.toml` in the working directory
//! 4. `TALLY_*` environment variables
//! 5. command-line flags (applied by `main`)
//!
//! `--config <PATH>` replaces sources 2 and 3 with the given file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the project-local config file.
pub const PROJECT_CONFIG_FILE: &str = "tally.toml";

/// Prefix for configuration environment variables.
const ENV_PREFIX: &str = "TALLY_";

/// Configuration for the tally binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Print the bytecode listing before running a program
    pub listing: bool,

    /// Colored diagnostics
    pub color: bool,

    /// Log filter used when `RUST_LOG` is unset
    pub log: String,

    /// Number of REPL history entries kept
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing: false,
            color: true,
            log: "warn".to_string(),
            history_size: 1000,
        }
    }
}

impl Config {
    /// Load configuration from the default locations, or only from
    /// `explicit` when given.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        match explicit {
            Some(path) => config.merge_from_file(path)?,
            None => {
                if let Some(path) = user_config_path() {
                    if path.exists() {
                        config.merge_from_file(&path)?;
                    }
                }

                let project = PathBuf::from(PROJECT_CONFIG_FILE);
                if project.exists() {
                    config.merge_from_file(&project)?;
                }
            }
        }

        config.load_from_env(std::env::vars());
        Ok(config)
    }

    /// Merge configuration from a TOML file.
    pub fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        self.merge_from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(())
    }

    /// Merge the keys present in a TOML document over the current values.
    ///
    /// Unknown keys are ignored.
    pub fn merge_from_str(&mut self, content: &str) -> Result<()> {
        let overrides: toml::Table = content.parse()?;

        let mut merged = match toml::Value::try_from(&*self)? {
            toml::Value::Table(table) => table,
            _ => toml::Table::new(),
        };
        merged.extend(overrides);

        *self = toml::Value::Table(merged).try_into()?;
        Ok(())
    }

    /// Apply `TALLY_*` variables from the given environment.
    pub fn load_from_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                self.set(&config_key.to_lowercase(), &value);
            }
        }
    }

    /// Set a configuration value from its string form.
    ///
    /// Unknown keys and unparsable values are ignored.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "listing" => {
                if let Some(flag) = parse_bool(value) {
                    self.listing = flag;
                }
            }
            "color" => {
                if let Some(flag) = parse_bool(value) {
                    self.color = flag;
                }
            }
            "log" => self.log = value.to_string(),
            "history_size" => {
                if let Ok(n) = value.parse() {
                    self.history_size = n;
                }
            }
            _ => {}
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the user config path.
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tally").join("config.toml"))
}

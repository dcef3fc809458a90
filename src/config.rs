//! Build metadata handling for Strata runs.
//! This module defines the feature selections that drive both template
//! generation and conditional compilation, along with loading them from a
//! configuration file.

use crate::error::{Error, Result};
use crate::eval::Value;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Supported configuration file names, tried in order.
pub const CONFIG_FILES: [&str; 3] = ["strata.json", "strata.yml", "strata.yaml"];

/// Prefix shared by every marker flag name (`import.meta.STRATA_*`).
pub const MARKER_PREFIX: &str = "STRATA_";

/// Raw token whose presence in a source file marks it for conditional
/// compilation.
pub const MARKER_TOKEN: &str = "import.meta.STRATA_";

/// The feature selections of one run.
///
/// Fixed before materialization starts and never mutated afterwards; both the
/// template generators and the conditional compiler read from the same
/// instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Selected framework, e.g. "react" or "solid"
    pub framework: String,
    /// Selected database, or `None` when the project uses none
    #[serde(default)]
    pub database: Option<String>,
    /// Additional boolean feature flags, keyed by lowercase name
    #[serde(default)]
    pub flags: IndexMap<String, bool>,
}

impl Metadata {
    pub fn new(framework: impl Into<String>, database: Option<String>) -> Self {
        Self { framework: framework.into(), database, flags: IndexMap::new() }
    }

    /// Resolves a marker flag name (the part after `import.meta.`) to its
    /// concrete value.
    ///
    /// # Returns
    /// * `Some(Value)` for recognized markers, `None` otherwise. Callers
    ///   treat `None` as a fatal unknown-marker condition.
    pub fn marker_value(&self, flag: &str) -> Option<Value> {
        let name = flag.strip_prefix(MARKER_PREFIX)?;
        match name {
            "FRAMEWORK" => Some(Value::Str(self.framework.clone())),
            "DATABASE" => Some(
                self.database.clone().map(Value::Str).unwrap_or(Value::Null),
            ),
            _ => self
                .flags
                .get(&name.to_lowercase())
                .map(|enabled| Value::Bool(*enabled)),
        }
    }
}

/// Looks for a configuration file in the given directory.
///
/// Tries `strata.json`, `strata.yml` and `strata.yaml` in that order and
/// returns the first one that exists.
pub fn find_config_file<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    for file in CONFIG_FILES {
        let config_path = dir.as_ref().join(file);
        if config_path.exists() {
            return Some(config_path);
        }
    }
    None
}

/// Loads run metadata from a configuration file.
///
/// The content is parsed as JSON first and as YAML on failure, so both
/// `strata.json` and `strata.yml`/`strata.yaml` work with one loader.
///
/// # Errors
/// * `Error::Config` if the file cannot be parsed in either format
pub fn load_metadata<P: AsRef<Path>>(path: P) -> Result<Metadata> {
    let path = path.as_ref();
    debug!("Loading metadata from {}", path.display());
    let content = std::fs::read_to_string(path)?;

    match serde_json::from_str(&content) {
        Ok(metadata) => Ok(metadata),
        Err(_) => serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid metadata format: {}", e))),
    }
}

//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::topology::DEFAULT_MAX_DEPTH;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Maximum nesting of sub-resources before a query fails
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Name of the embedded rule template to use
    #[serde(default = "default_rules")]
    pub rules: String,

    /// Path to a rule template file (takes precedence over `rules`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Logger configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Write debug logs to a temporary file
    #[serde(default)]
    pub debug: bool,

    /// Filter directive used when RUST_LOG is unset (e.g. "kube_topology=trace")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

// Default value functions
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_rules() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            rules: default_rules(),
            rules_file: None,
            logger: LoggerConfig::default(),
        }
    }
}

//! Configuration for kube-topology
//!
//! Selects the rule template, bounds recursion and controls logging. Values
//! come from built-in defaults, the root `config.yaml` and environment
//! overrides, in increasing order of precedence.

pub mod embedded_rules;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LoggerConfig};

use anyhow::Result;
use std::sync::Arc;

use crate::kube::ResourceStore;
use crate::topology::ResourceTopology;

impl ResourceTopology {
    /// Build a topology from configuration
    pub fn from_config(config: &Config, store: Arc<dyn ResourceStore>) -> Result<Self> {
        ConfigLoader::validate(config)?;
        let template = ConfigLoader::rule_template(config)?;
        Ok(ResourceTopology::new(template, store).with_max_depth(config.max_depth))
    }
}

//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{embedded_rules, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        let root_path = paths::root_config_path();
        let config = if root_path.exists() {
            Self::load_file(&root_path)?
        } else {
            Config::default()
        };
        Ok(Self::apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Self::validate(&config)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Check values serde cannot check for us
    pub fn validate(config: &Config) -> Result<()> {
        if config.max_depth == 0 {
            anyhow::bail!("maxDepth must be at least 1");
        }
        if config.rules_file.is_none() && embedded_rules::get_embedded_rules(&config.rules).is_none()
        {
            anyhow::bail!(
                "rules '{}' is not an embedded rule set (available: {})",
                config.rules,
                embedded_rules::EMBEDDED_RULES.join(", ")
            );
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// `lookup` resolves a variable name to its value; `load` passes the
    /// process environment.
    pub fn apply_env_overrides(
        mut config: Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Config {
        // KUBE_TOPOLOGY_MAX_DEPTH override
        if let Some(depth) = lookup("KUBE_TOPOLOGY_MAX_DEPTH") {
            match depth.parse::<usize>() {
                Ok(val) if val > 0 => config.max_depth = val,
                _ => tracing::warn!("Ignoring invalid KUBE_TOPOLOGY_MAX_DEPTH: {}", depth),
            }
        }

        // KUBE_TOPOLOGY_RULES_FILE override
        if let Some(file) = lookup("KUBE_TOPOLOGY_RULES_FILE") {
            if !file.is_empty() {
                config.rules_file = Some(file.into());
            }
        }

        config
    }

    /// Read the rule template selected by the configuration
    ///
    /// A configured `rulesFile` wins over the embedded `rules` name.
    pub fn rule_template(config: &Config) -> Result<String> {
        match &config.rules_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules file: {}", path.display())),
            None => embedded_rules::load_embedded_rules(&config.rules).map(str::to_string),
        }
    }
}

//! Rule templates embedded in the crate
//!
//! These are available without any files on disk. Users can still point
//! `rulesFile` at their own template.

use anyhow::Result;

/// Names of embedded rule templates
pub const EMBEDDED_RULES: &[&str] = &["default"];

/// Get an embedded rule template by name
pub fn get_embedded_rules(name: &str) -> Option<&'static str> {
    match name {
        "default" => Some(include_str!("embedded_rules/default.yaml")),
        _ => None,
    }
}

/// Get an embedded rule template by name, failing for unknown names
pub fn load_embedded_rules(name: &str) -> Result<&'static str> {
    get_embedded_rules(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Embedded rules '{}' not found (available: {})",
            name,
            EMBEDDED_RULES.join(", ")
        )
    })
}

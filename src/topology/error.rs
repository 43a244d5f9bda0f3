//! Topology errors

use super::models::ResourceRef;

/// Errors returned by topology queries
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Resource not found: {0}")]
    NotFound(ResourceRef),

    #[error("Resource store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Unknown resource kind {kind} in group '{group}'")]
    UnknownKind { group: String, kind: String },

    #[error("Failed to render rule template: {0}")]
    Render(String),

    #[error("No rules found")]
    RulesNotFound,

    #[error("No rule found for resource {group}/{kind}")]
    RuleNotFound { group: String, kind: String },

    #[error("Selector is required ({declaration} for {resource})")]
    SelectorMissing {
        resource: ResourceRef,
        declaration: String,
    },

    #[error("Unknown selector [{key}] for {resource}")]
    UnsupportedSelector { key: String, resource: ResourceRef },

    #[error("Unsupported built-in rule {0}")]
    UnsupportedBuiltin(String),

    #[error("Invalid value at {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Sub-resource expansion of {resource} exceeded max depth {max_depth}")]
    DepthExceeded {
        resource: ResourceRef,
        max_depth: usize,
    },
}

impl TopologyError {
    /// True for the "no rule applies" conditions that expansion treats as a leaf
    pub fn is_missing_rule(&self) -> bool {
        matches!(self, Self::RulesNotFound | Self::RuleNotFound { .. })
    }

    pub(crate) fn decode(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;

//! Rule template compilation
//!
//! Rule templates are Jinja-flavoured YAML. The live object being queried is
//! exposed to the template as `context.data`, for example:
//!
//! ```yaml
//! rules:
//!   - group: apps
//!     kind: Deployment
//!     subResources:
//!       - group: apps
//!         kind: ReplicaSet
//!         selector:
//!           ownerReference: true
//! {% if context.data.spec.selector is defined %}
//!     peerResources:
//!       - kind: Service
//!         selector:
//!           builtin: service
//! {% endif %}
//! ```

use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Value, json};

use super::Document;
use crate::topology::{TopologyError, TopologyResult};

/// Key the render context is exposed under in templates
pub const CONTEXT_KEY: &str = "context";
/// Key the live object is exposed under inside the context
pub const DATA_KEY: &str = "data";

/// Renders a rule template against a context into a [`Document`]
pub trait TemplateCompiler: Send + Sync {
    fn render(&self, template: &str, context: &Value) -> TopologyResult<Document>;
}

/// Build the render context for a live object: `{"context": {"data": <object>}}`
pub fn render_context(live: Value) -> Value {
    json!({ CONTEXT_KEY: { DATA_KEY: live } })
}

/// Template compiler backed by minijinja, producing YAML documents
///
/// Undefined variables are errors, so a template that dereferences a field
/// the live object lacks fails loudly instead of rendering an empty value.
/// Use `is defined` tests or the `default` filter for optional fields.
pub struct JinjaCompiler {
    env: Environment<'static>,
}

impl Default for JinjaCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl JinjaCompiler {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env }
    }
}

impl TemplateCompiler for JinjaCompiler {
    fn render(&self, template: &str, context: &Value) -> TopologyResult<Document> {
        let rendered = self
            .env
            .render_str(template, context)
            .map_err(|e| TopologyError::Render(format!("{:#}", e)))?;
        tracing::trace!("Rendered rule template:\n{}", rendered);
        Document::from_yaml(&rendered)
    }
}

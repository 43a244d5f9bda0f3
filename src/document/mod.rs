//! Rendered rule documents
//!
//! A [`Document`] is the structured result of rendering a rule template
//! against a live resource. The topology engine only navigates documents
//! through this module: path lookup, list iteration, typed decoding and
//! kind introspection. It never depends on the template language itself.

mod compiler;

pub use compiler::{CONTEXT_KEY, DATA_KEY, JinjaCompiler, TemplateCompiler, render_context};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::topology::{TopologyError, TopologyResult};

/// Kind of a document value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    List,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
        }
    }
}

/// A rendered rule document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a YAML (or JSON) document
    pub fn from_yaml(text: &str) -> TopologyResult<Self> {
        let root: Value = serde_yaml::from_str(text)
            .map_err(|e| TopologyError::Render(format!("rendered rules are not valid YAML: {}", e)))?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> DocumentNode<'_> {
        DocumentNode::new(&self.root, "")
    }

    /// Look up a dotted path from the document root
    pub fn lookup(&self, path: &str) -> Option<DocumentNode<'_>> {
        self.root().lookup(path)
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

/// A borrowed view of one value inside a document, remembering its path
#[derive(Debug, Clone)]
pub struct DocumentNode<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> DocumentNode<'a> {
    pub fn new(value: &'a Value, path: impl Into<String>) -> Self {
        Self {
            value,
            path: path.into(),
        }
    }

    /// Dotted path of this node from the document root
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn kind(&self) -> ValueKind {
        ValueKind::of(self.value)
    }

    /// Look up a dotted path relative to this node
    ///
    /// Numeric segments index into lists (`rules.0.group`). Returns `None`
    /// when any segment does not exist; an explicit `null` counts as absent.
    pub fn lookup(&self, path: &str) -> Option<DocumentNode<'a>> {
        let mut current = self.value;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() {
            return None;
        }
        Some(DocumentNode::new(current, self.join(path)))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Iterate the elements of a list value
    pub fn list(&self) -> TopologyResult<Vec<DocumentNode<'a>>> {
        match self.value {
            Value::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, item)| DocumentNode::new(item, self.join(&i.to_string())))
                .collect()),
            other => Err(self.unexpected("list", other)),
        }
    }

    /// Iterate the fields of an object value in document order
    pub fn fields(&self) -> TopologyResult<Vec<(&'a str, DocumentNode<'a>)>> {
        match self.value {
            Value::Object(map) => Ok(map
                .iter()
                .map(|(key, value)| (key.as_str(), DocumentNode::new(value, self.join(key))))
                .collect()),
            other => Err(self.unexpected("object", other)),
        }
    }

    pub fn as_str(&self) -> TopologyResult<&'a str> {
        self.value
            .as_str()
            .ok_or_else(|| self.unexpected("string", self.value))
    }

    pub fn as_bool(&self) -> TopologyResult<bool> {
        self.value
            .as_bool()
            .ok_or_else(|| self.unexpected("bool", self.value))
    }

    /// Decode this value into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> TopologyResult<T> {
        T::deserialize(self.value).map_err(|e| TopologyError::decode(self.display_path(), e))
    }

    fn join(&self, segment: &str) -> String {
        match (self.path.is_empty(), segment.is_empty()) {
            (_, true) => self.path.clone(),
            (true, false) => segment.to_string(),
            (false, false) => format!("{}.{}", self.path, segment),
        }
    }

    fn display_path(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.clone()
        }
    }

    fn unexpected(&self, expected: &str, found: &Value) -> TopologyError {
        TopologyError::decode(
            self.display_path(),
            format!("expected {}, found {}", expected, ValueKind::of(found).as_str()),
        )
    }
}

//! Data structures for topology results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Group used by the core API (Pods, Services, ConfigMaps, ...)
pub const CORE_GROUP: &str = "";

/// Identity of a resource in the cluster
///
/// Equality and hashing cover all four fields, so two refs are the same
/// resource only when group, kind, name and namespace all match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    #[serde(default)]
    pub group: String,
    #[serde(default, alias = "resource")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl ResourceRef {
    pub fn new(
        group: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Key used to look up the rule for this resource ("group/kind")
    pub fn group_kind(&self) -> String {
        group_kind_key(&self.group, &self.kind)
    }

    /// Whether this resource has the given group and kind
    pub fn is(&self, group: &str, kind: &str) -> bool {
        self.group == group && self.kind == kind
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = if self.group.is_empty() {
            "core"
        } else {
            self.group.as_str()
        };
        if self.namespace.is_empty() {
            write!(f, "{}/{} {}", group, self.kind, self.name)
        } else {
            write!(f, "{}/{} {}/{}", group, self.kind, self.namespace, self.name)
        }
    }
}

/// Build the "group/kind" key rules are indexed by
pub fn group_kind_key(group: &str, kind: &str) -> String {
    format!("{}/{}", group, kind)
}

/// A node in a sub-resource tree
///
/// Children keep discovery order: selector declaration order first, then the
/// order the store returned objects in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    #[serde(flatten)]
    pub resource: ResourceRef,
    #[serde(default)]
    pub children: Vec<SubResource>,
}

impl SubResource {
    pub fn new(resource: ResourceRef, children: Vec<SubResource>) -> Self {
        Self { resource, children }
    }

    /// All resources in this subtree, pre-order, including this node
    pub fn flatten(&self) -> Vec<&ResourceRef> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a ResourceRef>) {
        out.push(&self.resource);
        for child in &self.children {
            child.collect(out);
        }
    }

    /// All resources in this subtree with the given group and kind
    pub fn find_all(&self, group: &str, kind: &str) -> Vec<ResourceRef> {
        self.flatten()
            .into_iter()
            .filter(|r| r.is(group, kind))
            .cloned()
            .collect()
    }
}

/// Render a forest of sub-resources as an indented text tree
pub fn render_tree(nodes: &[SubResource]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, 0, &mut out);
    }
    out
}

fn render_node(node: &SubResource, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&node.resource.to_string());
    out.push('\n');
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}

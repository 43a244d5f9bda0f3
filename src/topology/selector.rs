//! Selector decoding and evaluation
//!
//! A declaration names a base group/kind and carries exactly one `selector`
//! mapping. Selectors are decoded into [`Selector`] before anything is
//! evaluated, so an unknown key fails the whole declaration up front.

use std::collections::BTreeMap;

use super::error::{TopologyError, TopologyResult};
use super::models::ResourceRef;
use super::rules::BaseIdentity;
use crate::document::{DocumentNode, ValueKind};
use crate::kube::{ListFilter, ResourceStore, StoredObject};

pub const SELECTOR_KEY: &str = "selector";

pub const NAME_SELECTOR: &str = "name";
pub const NAMESPACE_SELECTOR: &str = "namespace";
pub const BUILTIN_SELECTOR: &str = "builtin";
pub const ANNOTATIONS_SELECTOR: &str = "annotations";
pub const LABELS_SELECTOR: &str = "labels";
pub const OWNER_REFERENCE_SELECTOR: &str = "ownerReference";

/// A decoded selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Hand off to a built-in heuristic; every other key is ignored
    Builtin(String),
    /// Clauses evaluated in the order they were written, results concatenated
    Clauses(Vec<SelectorClause>),
}

/// One key of a selector mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorClause {
    /// Literal names in the relation's namespace
    Names(Vec<String>),
    /// Every object of the base kind in a namespace
    Namespace(String),
    /// Objects carrying all of these labels
    Labels(BTreeMap<String, String>),
    /// Objects whose annotations are exactly these
    Annotations(BTreeMap<String, String>),
    /// Objects in the relation's namespace, owned by it when `true`
    OwnerReference(bool),
}

/// A decoded `subResources` / `peerResources` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub base: BaseIdentity,
    pub selector: Selector,
}

impl Declaration {
    /// Decode a declaration; `relation` is only used for error context
    pub fn decode(node: &DocumentNode<'_>, relation: &ResourceRef) -> TopologyResult<Self> {
        let base: BaseIdentity = node.decode()?;
        let selector = node
            .lookup(SELECTOR_KEY)
            .ok_or_else(|| TopologyError::SelectorMissing {
                resource: relation.clone(),
                declaration: node.path().to_string(),
            })?;
        Ok(Self {
            base,
            selector: Selector::decode(&selector, relation)?,
        })
    }
}

impl Selector {
    pub fn decode(node: &DocumentNode<'_>, relation: &ResourceRef) -> TopologyResult<Self> {
        let fields = node.fields()?;

        if let Some((_, tag)) = fields.iter().find(|(key, _)| *key == BUILTIN_SELECTOR) {
            return Ok(Self::Builtin(tag.as_str()?.to_string()));
        }

        let mut clauses = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            let clause = match key {
                NAME_SELECTOR => match value.kind() {
                    ValueKind::String => SelectorClause::Names(vec![value.as_str()?.to_string()]),
                    _ => SelectorClause::Names(value.decode()?),
                },
                NAMESPACE_SELECTOR => SelectorClause::Namespace(value.as_str()?.to_string()),
                LABELS_SELECTOR => SelectorClause::Labels(value.decode()?),
                ANNOTATIONS_SELECTOR => SelectorClause::Annotations(value.decode()?),
                OWNER_REFERENCE_SELECTOR => SelectorClause::OwnerReference(value.as_bool()?),
                other => {
                    return Err(TopologyError::UnsupportedSelector {
                        key: other.to_string(),
                        resource: relation.clone(),
                    });
                }
            };
            clauses.push(clause);
        }
        Ok(Self::Clauses(clauses))
    }
}

impl SelectorClause {
    /// Resolve this clause to concrete resources of the `base` group/kind
    pub async fn evaluate(
        &self,
        store: &dyn ResourceStore,
        base: &BaseIdentity,
        relation: &ResourceRef,
    ) -> TopologyResult<Vec<ResourceRef>> {
        let items = match self {
            Self::Names(names) => {
                return Ok(names
                    .iter()
                    .map(|name| ResourceRef {
                        group: base.group.clone(),
                        kind: base.kind.clone(),
                        name: name.clone(),
                        namespace: relation.namespace.clone(),
                    })
                    .collect());
            }
            Self::Namespace(namespace) => {
                list(store, base, &ListFilter::in_namespace(namespace)).await?
            }
            Self::Labels(labels) => {
                list(store, base, &ListFilter::with_labels(labels.clone())).await?
            }
            Self::Annotations(annotations) => {
                let items = list(store, base, &ListFilter::default()).await?;
                if annotations.is_empty() {
                    items
                } else {
                    items
                        .into_iter()
                        .filter(|item| &item.annotations == annotations)
                        .collect()
                }
            }
            Self::OwnerReference(owned) => {
                let items =
                    list(store, base, &ListFilter::in_namespace(&relation.namespace)).await?;
                if *owned {
                    items
                        .into_iter()
                        .filter(|item| item.is_owned_by(relation))
                        .collect()
                } else {
                    items
                }
            }
        };

        Ok(items
            .into_iter()
            .map(|item| ResourceRef {
                group: base.group.clone(),
                kind: base.kind.clone(),
                name: item.name,
                namespace: item.namespace,
            })
            .collect())
    }
}

async fn list(
    store: &dyn ResourceStore,
    base: &BaseIdentity,
    filter: &ListFilter,
) -> TopologyResult<Vec<StoredObject>> {
    store.list(&base.group, &base.kind, filter).await
}

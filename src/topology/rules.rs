//! Rule lookup within a rendered document

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{TopologyError, TopologyResult};
use super::models::{ResourceRef, group_kind_key};
use crate::document::{Document, DocumentNode};

pub const RULES_KEY: &str = "rules";
pub const SUB_RESOURCES_KEY: &str = "subResources";
pub const PEER_RESOURCES_KEY: &str = "peerResources";

/// Group/kind a rule or declaration applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BaseIdentity {
    #[serde(default)]
    pub group: String,
    #[serde(default, alias = "resource")]
    pub kind: String,
}

/// The rule for one group/kind
#[derive(Debug, Clone)]
pub struct Rule {
    pub base: BaseIdentity,
    value: Value,
    path: String,
}

impl Rule {
    fn node(&self) -> DocumentNode<'_> {
        DocumentNode::new(&self.value, self.path.clone())
    }

    /// `subResources` declarations, empty when the rule has none
    pub fn sub_resources(&self) -> TopologyResult<Vec<DocumentNode<'_>>> {
        self.declarations(SUB_RESOURCES_KEY)
    }

    /// `peerResources` declarations, empty when the rule has none
    pub fn peer_resources(&self) -> TopologyResult<Vec<DocumentNode<'_>>> {
        self.declarations(PEER_RESOURCES_KEY)
    }

    fn declarations(&self, key: &str) -> TopologyResult<Vec<DocumentNode<'_>>> {
        match self.node().lookup(key) {
            Some(list) => list.list(),
            None => Ok(Vec::new()),
        }
    }
}

/// Lazily built `group/kind` → rule index for one rendered document
///
/// Built on first lookup and reused for every lookup after that; it must not
/// outlive the document it was built from.
#[derive(Debug, Default)]
pub struct RuleIndex {
    rules: Option<HashMap<String, Arc<Rule>>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.rules.is_some()
    }

    /// Find the rule for a resource's group/kind
    pub fn rule_for(
        &mut self,
        document: &Document,
        resource: &ResourceRef,
    ) -> TopologyResult<Arc<Rule>> {
        if self.rules.is_none() {
            self.rules = Some(build_index(document)?);
        }
        self.rules
            .as_ref()
            .and_then(|rules| rules.get(&resource.group_kind()))
            .cloned()
            .ok_or_else(|| TopologyError::RuleNotFound {
                group: resource.group.clone(),
                kind: resource.kind.clone(),
            })
    }
}

fn build_index(document: &Document) -> TopologyResult<HashMap<String, Arc<Rule>>> {
    let rules = document
        .lookup(RULES_KEY)
        .ok_or(TopologyError::RulesNotFound)?;
    let mut index = HashMap::new();
    for entry in rules.list()? {
        let base: BaseIdentity = entry.decode()?;
        let key = group_kind_key(&base.group, &base.kind);
        if index.contains_key(&key) {
            tracing::warn!("Duplicate rule for {} at {}, using the later one", key, entry.path());
        }
        index.insert(
            key,
            Arc::new(Rule {
                base,
                value: entry.value().clone(),
                path: entry.path().to_string(),
            }),
        );
    }
    tracing::debug!("Indexed {} topology rule(s)", index.len());
    Ok(index)
}

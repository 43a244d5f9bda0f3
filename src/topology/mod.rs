//! Resource topology
//!
//! Discovers the sub-resources (owned or spawned, recursively) and peer
//! resources of a Kubernetes object by evaluating a declarative rule
//! template against the object's live state.
//!
//! A query runs in four steps: fetch the object, render the rule template
//! with the object as `context.data`, find the rule for the object's
//! group/kind, and evaluate that rule's `subResources` (recursively) or
//! `peerResources` (one level) selectors against the cluster.

mod builtin;
mod core;
mod error;
mod models;
mod rules;
mod selector;

pub use builtin::{SERVICE_BUILTIN, services_targeting};
pub use core::{DEFAULT_MAX_DEPTH, ResourceTopology, Topology, Traversal};
pub use error::{TopologyError, TopologyResult};
pub use models::{CORE_GROUP, ResourceRef, SubResource, group_kind_key, render_tree};
pub use rules::{BaseIdentity, Rule, RuleIndex};
pub use selector::{Declaration, Selector, SelectorClause};

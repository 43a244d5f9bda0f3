//! Read access to cluster state
//!
//! The topology engine only talks to the cluster through [`ResourceStore`].
//! [`super::KubeResourceStore`] implements it over the Kubernetes API;
//! tests substitute a mock.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::topology::{ResourceRef, TopologyResult};

/// Filters applied server-side to a list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Restrict to one namespace (`None` lists across all namespaces)
    pub namespace: Option<String>,
    /// Exact-match label selector (`k=v` for every entry)
    pub labels: BTreeMap<String, String>,
}

impl ListFilter {
    pub fn in_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    pub fn with_labels(labels: BTreeMap<String, String>) -> Self {
        Self {
            labels,
            ..Default::default()
        }
    }

    /// Label selector string as understood by the API server
    pub fn label_selector(&self) -> Option<String> {
        if self.labels.is_empty() {
            return None;
        }
        Some(
            self.labels
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Owner reference of a listed object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
}

/// Metadata of an object returned by a list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub owner_references: Vec<OwnerRef>,
}

impl StoredObject {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn owned_by(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.owner_references.push(OwnerRef {
            kind: kind.into(),
            name: name.into(),
        });
        self
    }

    pub fn is_owned_by(&self, owner: &ResourceRef) -> bool {
        self.owner_references
            .iter()
            .any(|r| r.name == owner.name && r.kind == owner.kind)
    }
}

/// Target of one endpoint in an EndpointSlice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTarget {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

/// The parts of an EndpointSlice the service heuristic needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSliceInfo {
    pub name: String,
    /// Name of the first owner reference (the Service that manages the slice)
    pub owner: Option<String>,
    /// Endpoint targets, one entry per endpoint that has a target reference
    pub targets: Vec<EndpointTarget>,
}

/// Read-only view of the cluster
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch the live representation of a resource
    async fn fetch_live(&self, resource: &ResourceRef) -> TopologyResult<Value>;

    /// List objects of a group/kind
    async fn list(
        &self,
        group: &str,
        kind: &str,
        filter: &ListFilter,
    ) -> TopologyResult<Vec<StoredObject>>;

    /// List EndpointSlices (discovery.k8s.io/v1) in a namespace
    async fn list_endpoint_slices(&self, namespace: &str)
    -> TopologyResult<Vec<EndpointSliceInfo>>;
}

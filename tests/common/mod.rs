//! Shared helpers for topology integration tests
//!
//! The resource store is mocked with mockall, so no cluster is needed.

#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use kube_topology::kube::{EndpointSliceInfo, ListFilter, ResourceStore, StoredObject};
use kube_topology::topology::TopologyResult;
use kube_topology::{ResourceRef, ResourceTopology};
use mockall::mock;
use serde_json::{Value, json};
use std::sync::Arc;

mock! {
    pub Store {}

    #[async_trait]
    impl ResourceStore for Store {
        async fn fetch_live(&self, resource: &ResourceRef) -> TopologyResult<Value>;
        async fn list(
            &self,
            group: &str,
            kind: &str,
            filter: &ListFilter,
        ) -> TopologyResult<Vec<StoredObject>>;
        async fn list_endpoint_slices(
            &self,
            namespace: &str,
        ) -> TopologyResult<Vec<EndpointSliceInfo>>;
    }
}

/// A minimal live object for a resource reference
pub fn live_object(resource: &ResourceRef) -> Value {
    let api_version = if resource.group.is_empty() {
        "v1".to_string()
    } else {
        format!("{}/v1", resource.group)
    };
    json!({
        "apiVersion": api_version,
        "kind": resource.kind,
        "metadata": {"name": resource.name, "namespace": resource.namespace}
    })
}

/// A store whose `fetch_live` answers with a minimal object for any resource
pub fn store_with_live_objects() -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_fetch_live()
        .returning(|resource| Ok(live_object(resource)));
    store
}

pub fn topology(rules: &str, store: MockStore) -> ResourceTopology {
    ResourceTopology::new(rules, Arc::new(store))
}

pub fn deployment() -> ResourceRef {
    ResourceRef::new("apps", "Deployment", "ns", "web")
}

pub fn pod(name: &str) -> ResourceRef {
    ResourceRef::new("", "Pod", "ns", name)
}

//! [`ResourceStore`] backed by the Kubernetes API

use async_trait::async_trait;
use k8s_openapi::api::discovery::v1::EndpointSlice;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Api;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject};
use kube::discovery::Scope;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::store::{
    EndpointSliceInfo, EndpointTarget, ListFilter, OwnerRef, ResourceStore, StoredObject,
};
use crate::topology::{ResourceRef, TopologyError, TopologyResult, group_kind_key};

/// API coordinates of a group/kind as resolved through discovery
#[derive(Debug, Clone)]
struct ResolvedKind {
    api_resource: ApiResource,
    namespaced: bool,
}

/// Resource store that reads from a live cluster
///
/// Group/kind pairs are resolved through API discovery using the server's
/// preferred version. Resolutions are remembered for the lifetime of the
/// store; object data is always read fresh.
pub struct KubeResourceStore {
    client: kube::Client,
    kinds: RwLock<HashMap<String, ResolvedKind>>,
}

impl KubeResourceStore {
    pub fn new(client: kube::Client) -> Self {
        Self {
            client,
            kinds: RwLock::new(HashMap::new()),
        }
    }

    /// Get a reference to the underlying Kubernetes client
    pub fn client(&self) -> &kube::Client {
        &self.client
    }

    /// Resolve a group/kind pair to its API coordinates
    async fn resolve(&self, group: &str, kind: &str) -> TopologyResult<ResolvedKind> {
        let key = group_kind_key(group, kind);
        if let Some(resolved) = self.kinds.read().await.get(&key) {
            return Ok(resolved.clone());
        }

        let api_group = kube::discovery::group(&self.client, group)
            .await
            .map_err(|e| {
                tracing::debug!("Discovery failed for group '{}': {}", group, e);
                TopologyError::StoreUnavailable(format!(
                    "failed to discover API group '{}': {}",
                    group, e
                ))
            })?;
        let (api_resource, caps) =
            api_group
                .recommended_kind(kind)
                .ok_or_else(|| TopologyError::UnknownKind {
                    group: group.to_string(),
                    kind: kind.to_string(),
                })?;

        tracing::debug!(
            "Resolved {} to {} ({})",
            key,
            api_resource.api_version,
            api_resource.plural
        );
        let resolved = ResolvedKind {
            api_resource,
            namespaced: matches!(caps.scope, Scope::Namespaced),
        };
        self.kinds.write().await.insert(key, resolved.clone());
        Ok(resolved)
    }

    fn api_for(&self, resolved: &ResolvedKind, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) if resolved.namespaced && !ns.is_empty() => {
                Api::namespaced_with(self.client.clone(), ns, &resolved.api_resource)
            }
            _ => Api::all_with(self.client.clone(), &resolved.api_resource),
        }
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn fetch_live(&self, resource: &ResourceRef) -> TopologyResult<Value> {
        let resolved = self.resolve(&resource.group, &resource.kind).await?;
        let api = self.api_for(&resolved, Some(&resource.namespace));
        let obj = api
            .get_opt(&resource.name)
            .await
            .map_err(|e| store_error(&format!("fetch {}", resource), e))?
            .ok_or_else(|| TopologyError::NotFound(resource.clone()))?;
        serde_json::to_value(&obj).map_err(|e| {
            TopologyError::StoreUnavailable(format!("failed to serialize {}: {}", resource, e))
        })
    }

    async fn list(
        &self,
        group: &str,
        kind: &str,
        filter: &ListFilter,
    ) -> TopologyResult<Vec<StoredObject>> {
        let resolved = self.resolve(group, kind).await?;
        let api = self.api_for(&resolved, filter.namespace.as_deref());
        let mut params = ListParams::default();
        if let Some(selector) = filter.label_selector() {
            params = params.labels(&selector);
        }

        let list = api
            .list(&params)
            .await
            .map_err(|e| store_error(&format!("list {}", group_kind_key(group, kind)), e))?;
        tracing::debug!(
            "Listed {} {} object(s) (namespace: {:?})",
            list.items.len(),
            group_kind_key(group, kind),
            filter.namespace
        );
        Ok(list
            .items
            .into_iter()
            .map(|obj| stored_object(obj.metadata))
            .collect())
    }

    async fn list_endpoint_slices(
        &self,
        namespace: &str,
    ) -> TopologyResult<Vec<EndpointSliceInfo>> {
        let api: Api<EndpointSlice> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| store_error(&format!("list EndpointSlices in {}", namespace), e))?;
        Ok(list.items.into_iter().map(endpoint_slice_info).collect())
    }
}

fn store_error(action: &str, err: kube::Error) -> TopologyError {
    TopologyError::StoreUnavailable(format!("failed to {}: {}", action, err))
}

fn stored_object(meta: ObjectMeta) -> StoredObject {
    StoredObject {
        name: meta.name.unwrap_or_default(),
        namespace: meta.namespace.unwrap_or_default(),
        labels: meta.labels.unwrap_or_default(),
        annotations: meta.annotations.unwrap_or_default(),
        owner_references: meta
            .owner_references
            .unwrap_or_default()
            .into_iter()
            .map(|r| OwnerRef {
                kind: r.kind,
                name: r.name,
            })
            .collect(),
    }
}

fn endpoint_slice_info(slice: EndpointSlice) -> EndpointSliceInfo {
    let owner = slice
        .metadata
        .owner_references
        .as_ref()
        .and_then(|refs| refs.first())
        .map(|r| r.name.clone());
    let targets = slice
        .endpoints
        .into_iter()
        .filter_map(|endpoint| endpoint.target_ref)
        .map(|target| EndpointTarget {
            kind: target.kind.unwrap_or_default(),
            name: target.name.unwrap_or_default(),
            namespace: target.namespace.unwrap_or_default(),
        })
        .collect();
    EndpointSliceInfo {
        name: slice.metadata.name.unwrap_or_default(),
        owner,
        targets,
    }
}

//! Built-in relationship heuristics
//!
//! Some relationships cannot be written as a selector. `builtin: service`
//! finds the Services that route to a resource's Pods by matching the Pods in
//! its sub-resource tree against EndpointSlice targets.

use super::core::{ResourceTopology, Traversal};
use super::error::{TopologyError, TopologyResult};
use super::models::{CORE_GROUP, ResourceRef};
use crate::kube::EndpointSliceInfo;

pub const SERVICE_BUILTIN: &str = "service";

const POD_KIND: &str = "Pod";
const SERVICE_KIND: &str = "Service";

impl ResourceTopology {
    /// Dispatch a `builtin` selector by tag (case-insensitive)
    pub async fn resolve_builtin(
        &self,
        tag: &str,
        cx: &mut Traversal,
        relation: &ResourceRef,
    ) -> TopologyResult<Vec<ResourceRef>> {
        match tag.to_lowercase().as_str() {
            SERVICE_BUILTIN => self.services_for(cx, relation).await,
            _ => Err(TopologyError::UnsupportedBuiltin(tag.to_string())),
        }
    }

    /// Services whose EndpointSlices target Pods under `relation`
    async fn services_for(
        &self,
        cx: &mut Traversal,
        relation: &ResourceRef,
    ) -> TopologyResult<Vec<ResourceRef>> {
        let subs = self.expand(cx, relation).await?;
        let pods: Vec<ResourceRef> = subs
            .iter()
            .flat_map(|sub| sub.find_all(CORE_GROUP, POD_KIND))
            .collect();
        tracing::debug!("Found {} pod(s) under {}", pods.len(), relation);

        let slices = self
            .store()
            .list_endpoint_slices(&relation.namespace)
            .await?;
        Ok(services_targeting(&pods, &slices, &relation.namespace))
    }
}

/// Match EndpointSlice targets against `pods`
///
/// Emits the owning Service of a slice once per endpoint that targets one of
/// the pods, so a Service routing to two pods appears twice.
pub fn services_targeting(
    pods: &[ResourceRef],
    slices: &[EndpointSliceInfo],
    namespace: &str,
) -> Vec<ResourceRef> {
    let mut services = Vec::new();
    for slice in slices {
        for target in &slice.targets {
            let target_ref = ResourceRef {
                group: CORE_GROUP.to_string(),
                kind: target.kind.clone(),
                name: target.name.clone(),
                namespace: target.namespace.clone(),
            };
            if !pods.contains(&target_ref) {
                continue;
            }
            match &slice.owner {
                Some(owner) => services.push(ResourceRef {
                    group: CORE_GROUP.to_string(),
                    kind: SERVICE_KIND.to_string(),
                    name: owner.clone(),
                    namespace: namespace.to_string(),
                }),
                None => {
                    tracing::debug!("EndpointSlice {} has no owner, skipping", slice.name);
                }
            }
        }
    }
    services
}

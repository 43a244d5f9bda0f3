//! Kubernetes access module
//!
//! Provides the [`ResourceStore`] abstraction the topology engine reads the
//! cluster through, and its implementation over a kube-rs client.
//!
//! HTTP/HTTPS proxies are honoured via the standard environment variables
//! (`HTTP_PROXY`, `HTTPS_PROXY`, `NO_PROXY`).

mod cluster_store;
mod store;

pub use cluster_store::KubeResourceStore;
#[cfg(test)]
pub use store::MockResourceStore;
pub use store::{
    EndpointSliceInfo, EndpointTarget, ListFilter, OwnerRef, ResourceStore, StoredObject,
};

use anyhow::{Context, Result};
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;
    tracing::debug!("Connecting to cluster at {}", config.cluster_url);
    Client::try_from(config).context("Failed to create Kubernetes client")
}

/// Create a resource store for the cluster selected by the default kubeconfig
pub async fn create_store() -> Result<KubeResourceStore> {
    Ok(KubeResourceStore::new(create_client().await?))
}

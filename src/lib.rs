//! kube-topology
//!
//! Rule-driven discovery of Kubernetes resource relationships: the tree of
//! resources a workload owns (Deployment → ReplicaSet → Pod) and the
//! resources it is related to without owning (the Services routing to it).
//!
//! ```no_run
//! use std::sync::Arc;
//! use kube_topology::{ResourceRef, ResourceTopology, Topology, config::ConfigLoader};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ConfigLoader::load()?;
//! let store = Arc::new(kube_topology::kube::create_store().await?);
//! let topology = ResourceTopology::from_config(&config, store)?;
//!
//! let web = ResourceRef::new("apps", "Deployment", "shop", "web");
//! let tree = topology.get_sub_resources(&web).await?;
//! print!("{}", kube_topology::topology::render_tree(&tree));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod kube;
pub mod logging;
pub mod topology;

// Re-export commonly used types for convenience
pub use crate::document::{Document, JinjaCompiler, TemplateCompiler};
pub use crate::kube::{KubeResourceStore, ResourceStore};
pub use crate::topology::{ResourceRef, ResourceTopology, SubResource, Topology, TopologyError};

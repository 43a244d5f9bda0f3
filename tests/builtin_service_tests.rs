//! Integration tests for the `builtin: service` selector

mod common;

use common::{deployment, pod, store_with_live_objects, topology};
use kube_topology::config::embedded_rules::load_embedded_rules;
use kube_topology::kube::{EndpointSliceInfo, EndpointTarget, StoredObject};
use kube_topology::{ResourceRef, Topology, TopologyError};

const SERVICE_RULES: &str = r#"
rules:
  - group: apps
    kind: Deployment
    subResources:
      - kind: Pod
        selector:
          ownerReference: true
    peerResources:
      - kind: Service
        selector:
          builtin: service
"#;

fn target(name: &str) -> EndpointTarget {
    EndpointTarget {
        kind: "Pod".to_string(),
        name: name.to_string(),
        namespace: "ns".to_string(),
    }
}

fn slice(name: &str, owner: Option<&str>, targets: Vec<EndpointTarget>) -> EndpointSliceInfo {
    EndpointSliceInfo {
        name: name.to_string(),
        owner: owner.map(str::to_string),
        targets,
    }
}

fn service(name: &str) -> ResourceRef {
    ResourceRef::new("", "Service", "ns", name)
}

/// Pods p1 and p2 owned by Deployment `web`
fn store_with_pods() -> common::MockStore {
    let mut store = store_with_live_objects();
    store
        .expect_list()
        .withf(|group, kind, filter| {
            group.is_empty() && kind == "Pod" && filter.namespace.as_deref() == Some("ns")
        })
        .returning(|_, _, _| {
            Ok(vec![
                StoredObject::new("ns", "p1").owned_by("Deployment", "web"),
                StoredObject::new("ns", "p2").owned_by("Deployment", "web"),
            ])
        });
    store
}

#[tokio::test]
async fn test_service_targeting_a_pod() {
    let mut store = store_with_pods();
    store
        .expect_list_endpoint_slices()
        .withf(|namespace| namespace == "ns")
        .times(1)
        .returning(|_| {
            Ok(vec![
                slice("svc-a-x1", Some("svc-a"), vec![target("p1")]),
                slice("svc-b-x1", Some("svc-b"), vec![target("p9")]),
            ])
        });

    let peers = topology(SERVICE_RULES, store)
        .get_peer_resources(&deployment())
        .await
        .unwrap();
    assert_eq!(peers, vec![service("svc-a")]);
}

#[tokio::test]
async fn test_no_pods_means_no_services() {
    let mut store = store_with_live_objects();
    store.expect_list().returning(|_, _, _| Ok(Vec::new()));
    store
        .expect_list_endpoint_slices()
        .returning(|_| Ok(vec![slice("svc-a-x1", Some("svc-a"), vec![target("p1")])]));

    let peers = topology(SERVICE_RULES, store)
        .get_peer_resources(&deployment())
        .await
        .unwrap();
    assert!(peers.is_empty());
}

#[tokio::test]
async fn test_one_service_per_matching_endpoint() {
    let mut store = store_with_pods();
    store.expect_list_endpoint_slices().returning(|_| {
        Ok(vec![
            slice("svc-a-x1", Some("svc-a"), vec![target("p1"), target("p2")]),
            slice("orphan", None, vec![target("p1")]),
        ])
    });

    let peers = topology(SERVICE_RULES, store)
        .get_peer_resources(&deployment())
        .await
        .unwrap();
    assert_eq!(peers, vec![service("svc-a"), service("svc-a")]);
}

#[tokio::test]
async fn test_unknown_builtin_fails() {
    let rules = SERVICE_RULES.replace("builtin: service", "builtin: ingress");
    let err = topology(&rules, store_with_live_objects())
        .get_peer_resources(&deployment())
        .await
        .unwrap_err();
    assert!(matches!(err, TopologyError::UnsupportedBuiltin(ref tag) if tag == "ingress"));
}

#[tokio::test]
async fn test_builtin_tag_is_case_insensitive() {
    let rules = SERVICE_RULES.replace("builtin: service", "builtin: Service");
    let mut store = store_with_pods();
    store
        .expect_list_endpoint_slices()
        .returning(|_| Ok(vec![slice("svc-a-x1", Some("svc-a"), vec![target("p2")])]));

    let peers = topology(&rules, store)
        .get_peer_resources(&deployment())
        .await
        .unwrap();
    assert_eq!(peers, vec![service("svc-a")]);
}

#[tokio::test]
async fn test_default_rules_find_services_through_replica_sets() {
    let template = load_embedded_rules("default").unwrap();
    let mut store = store_with_live_objects();
    store
        .expect_list()
        .withf(|group, kind, _| group == "apps" && kind == "ReplicaSet")
        .returning(|_, _, _| {
            Ok(vec![StoredObject::new("ns", "web-rs").owned_by("Deployment", "web")])
        });
    store
        .expect_list()
        .withf(|group, kind, _| group.is_empty() && kind == "Pod")
        .returning(|_, _, _| {
            Ok(vec![StoredObject::new("ns", "web-rs-p1").owned_by("ReplicaSet", "web-rs")])
        });
    store
        .expect_list_endpoint_slices()
        .returning(|_| Ok(vec![slice("web-x1", Some("web"), vec![target("web-rs-p1")])]));

    let topo = topology(template, store);
    let peers = topo.get_peer_resources(&deployment()).await.unwrap();
    assert_eq!(peers, vec![service("web")]);

    let tree = topo.get_sub_resources(&deployment()).await.unwrap();
    assert_eq!(tree[0].find_all("", "Pod"), vec![pod("web-rs-p1")]);
}

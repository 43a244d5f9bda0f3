//! Integration tests for rule rendering and document binding

mod common;

use common::{MockStore, deployment, store_with_live_objects, topology};
use kube_topology::config::embedded_rules::load_embedded_rules;
use kube_topology::document::{DocumentNode, ValueKind, render_context};
use kube_topology::topology::{TopologyResult, group_kind_key};
use kube_topology::{
    Document, JinjaCompiler, ResourceRef, TemplateCompiler, Topology, TopologyError,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Compiler that ignores the template and records the contexts it saw
struct FixedCompiler {
    document: Value,
    seen: Mutex<Vec<Value>>,
}

impl TemplateCompiler for FixedCompiler {
    fn render(&self, _template: &str, context: &Value) -> TopologyResult<Document> {
        self.seen.lock().unwrap().push(context.clone());
        Ok(Document::new(self.document.clone()))
    }
}

fn ingress() -> Value {
    json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": {"name": "shop", "namespace": "ns"},
        "spec": {
            "rules": [
                {"host": "shop.example.com", "http": {"paths": [
                    {"path": "/", "backend": {"service": {"name": "frontend"}}},
                    {"path": "/api", "backend": {"service": {"name": "api"}}}
                ]}},
                {"host": "static.example.com"}
            ]
        }
    })
}

#[test]
fn test_rendered_document_navigation() {
    let template = r#"
rules:
  - group: {{ context.data.group | tojson }}
    kind: Deployment
    subResources:
      - kind: Pod
        selector:
          ownerReference: true
          labels: {{ context.data.labels | tojson }}
"#;
    let context = render_context(json!({"group": "apps", "labels": {"app": "web"}}));
    let doc = JinjaCompiler::new().render(template, &context).unwrap();

    let rules = doc.lookup("rules").unwrap().list().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].lookup("group").unwrap().as_str().unwrap(), "apps");

    let selector = doc.lookup("rules.0.subResources.0.selector").unwrap();
    assert_eq!(selector.kind(), ValueKind::Object);
    assert!(selector.lookup("ownerReference").unwrap().as_bool().unwrap());
    let keys: Vec<&str> = selector.fields().unwrap().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["ownerReference", "labels"]);
    assert!(!doc.root().exists("rules.0.peerResources"));
}

#[test]
fn test_decode_errors_carry_the_path() {
    let doc = Document::new(json!({"rules": [{"kind": 7}]}));
    let node = doc.lookup("rules.0.kind").unwrap();
    let err = node.as_str().unwrap_err();
    assert!(matches!(err, TopologyError::Decode { ref path, .. } if path == "rules.0.kind"));

    let root: DocumentNode<'_> = doc.root();
    assert!(root.list().is_err());
}

#[test]
fn test_ingress_backends_become_peer_declarations() {
    let template = load_embedded_rules("default").unwrap();
    let doc = JinjaCompiler::new()
        .render(template, &render_context(ingress()))
        .unwrap();

    let rules = doc.lookup("rules").unwrap().list().unwrap();
    let ingress_rule = rules
        .iter()
        .find(|rule| rule.lookup("kind").and_then(|k| k.as_str().ok()) == Some("Ingress"))
        .unwrap();
    let names: Vec<&str> = ingress_rule
        .lookup("peerResources")
        .unwrap()
        .list()
        .unwrap()
        .iter()
        .map(|decl| decl.lookup("selector.name").unwrap().as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["frontend", "api"]);
}

#[tokio::test]
async fn test_ingress_peers_through_the_engine() {
    let mut store = MockStore::new();
    store.expect_fetch_live().times(1).returning(|_| Ok(ingress()));
    let template = load_embedded_rules("default").unwrap();

    let shop = ResourceRef::new("networking.k8s.io", "Ingress", "ns", "shop");
    let peers = topology(template, store).get_peer_resources(&shop).await.unwrap();
    assert_eq!(
        peers,
        vec![
            ResourceRef::new("", "Service", "ns", "frontend"),
            ResourceRef::new("", "Service", "ns", "api"),
        ]
    );
}

#[tokio::test]
async fn test_custom_compiler_receives_the_live_object() {
    let compiler = Arc::new(FixedCompiler {
        document: json!({
            "rules": [{
                "group": "apps",
                "kind": "Deployment",
                "peerResources": [{"kind": "Secret", "selector": {"name": "tls"}}]
            }]
        }),
        seen: Mutex::new(Vec::new()),
    });

    let topo = topology("ignored", store_with_live_objects()).with_compiler(compiler.clone());
    let peers = topo.get_peer_resources(&deployment()).await.unwrap();
    assert_eq!(peers, vec![ResourceRef::new("", "Secret", "ns", "tls")]);

    let seen = compiler.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["context"]["data"]["metadata"]["name"], "web");
}

#[tokio::test]
async fn test_each_query_renders_afresh() {
    let compiler = Arc::new(FixedCompiler {
        document: json!({"rules": []}),
        seen: Mutex::new(Vec::new()),
    });
    let topo = topology("ignored", store_with_live_objects()).with_compiler(compiler.clone());

    topo.get_sub_resources(&deployment()).await.unwrap();
    topo.get_sub_resources(&deployment()).await.unwrap();
    assert_eq!(compiler.seen.lock().unwrap().len(), 2);
}

#[test]
fn test_group_kind_keys() {
    assert_eq!(group_kind_key("", "Pod"), "/Pod");
    assert_eq!(group_kind_key("apps", "Deployment"), "apps/Deployment");
}

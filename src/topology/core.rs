//! Core topology implementation

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

use super::error::{TopologyError, TopologyResult};
use super::models::{ResourceRef, SubResource};
use super::rules::{Rule, RuleIndex};
use super::selector::{Declaration, Selector};
use crate::document::{Document, DocumentNode, JinjaCompiler, TemplateCompiler, render_context};
use crate::kube::ResourceStore;

/// Default bound on sub-resource nesting
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Relationship queries over cluster resources
#[async_trait]
pub trait Topology: Send + Sync {
    /// Recursively discover the resources spawned or owned by `resource`
    async fn get_sub_resources(&self, resource: &ResourceRef) -> TopologyResult<Vec<SubResource>>;

    /// Discover the resources related to `resource` without owning it
    async fn get_peer_resources(&self, resource: &ResourceRef) -> TopologyResult<Vec<ResourceRef>>;
}

/// State of one top-level query
///
/// Holds the document rendered for the queried resource and the rule index
/// built from it. Every recursive step of the query shares this value; it is
/// dropped when the query returns.
#[derive(Debug)]
pub struct Traversal {
    document: Document,
    rules: RuleIndex,
    depth: usize,
    max_depth: usize,
}

impl Traversal {
    pub fn new(document: Document, max_depth: usize) -> Self {
        Self {
            document,
            rules: RuleIndex::new(),
            depth: 0,
            max_depth,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn rule_for(&mut self, resource: &ResourceRef) -> TopologyResult<Arc<Rule>> {
        self.rules.rule_for(&self.document, resource)
    }
}

/// Rule-driven resource topology
///
/// Every query fetches the resource, renders the rule template against it
/// and evaluates the resulting rules. Nothing is cached between queries.
pub struct ResourceTopology {
    rule_template: String,
    store: Arc<dyn ResourceStore>,
    compiler: Arc<dyn TemplateCompiler>,
    max_depth: usize,
}

impl ResourceTopology {
    pub fn new(rule_template: impl Into<String>, store: Arc<dyn ResourceStore>) -> Self {
        Self {
            rule_template: rule_template.into(),
            store,
            compiler: Arc::new(JinjaCompiler::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Use a different template compiler
    pub fn with_compiler(mut self, compiler: Arc<dyn TemplateCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Bound how many levels sub-resources may nest below the queried resource
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn rule_template(&self) -> &str {
        &self.rule_template
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn store(&self) -> &dyn ResourceStore {
        self.store.as_ref()
    }

    /// Fetch the live resource and render the rules against it
    pub async fn bind(&self, resource: &ResourceRef) -> TopologyResult<Traversal> {
        let live = self.store.fetch_live(resource).await?;
        let document = self
            .compiler
            .render(&self.rule_template, &render_context(live))?;
        tracing::debug!("Rendered topology rules for {}", resource);
        Ok(Traversal::new(document, self.max_depth))
    }

    /// Expand the sub-resource tree of `resource` within a traversal
    ///
    /// A resource without a rule is a leaf. Declarations are evaluated in
    /// order and every discovered child is expanded before the next one.
    pub fn expand<'a>(
        &'a self,
        cx: &'a mut Traversal,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, TopologyResult<Vec<SubResource>>> {
        Box::pin(async move {
            // The queried resource sits at depth 0 and does not count
            if cx.depth > cx.max_depth {
                return Err(TopologyError::DepthExceeded {
                    resource: resource.clone(),
                    max_depth: cx.max_depth,
                });
            }
            cx.depth += 1;
            let result = self.expand_rule(cx, resource).await;
            cx.depth -= 1;
            result
        })
    }

    async fn expand_rule(
        &self,
        cx: &mut Traversal,
        resource: &ResourceRef,
    ) -> TopologyResult<Vec<SubResource>> {
        let rule = match cx.rule_for(resource) {
            Ok(rule) => rule,
            Err(e) if e.is_missing_rule() => {
                tracing::trace!("{} has no sub-resources: {}", resource, e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut sub_resources = Vec::new();
        for declaration in rule.sub_resources()? {
            let items = self.evaluate(cx, &declaration, resource).await?;
            for item in items {
                let children = self.expand(cx, &item).await?;
                sub_resources.push(SubResource::new(item, children));
            }
        }
        Ok(sub_resources)
    }

    /// Resolve the peer resources of `resource` within a traversal
    pub async fn peers(
        &self,
        cx: &mut Traversal,
        resource: &ResourceRef,
    ) -> TopologyResult<Vec<ResourceRef>> {
        let rule = cx.rule_for(resource)?;
        let mut peers = Vec::new();
        for declaration in rule.peer_resources()? {
            peers.extend(self.evaluate(cx, &declaration, resource).await?);
        }
        Ok(peers)
    }

    /// Evaluate one declaration against the resource it belongs to
    pub async fn evaluate(
        &self,
        cx: &mut Traversal,
        declaration: &DocumentNode<'_>,
        relation: &ResourceRef,
    ) -> TopologyResult<Vec<ResourceRef>> {
        let Declaration { base, selector } = Declaration::decode(declaration, relation)?;
        match selector {
            Selector::Builtin(tag) => self.resolve_builtin(&tag, cx, relation).await,
            Selector::Clauses(clauses) => {
                let mut resources = Vec::new();
                for clause in &clauses {
                    resources.extend(clause.evaluate(self.store(), &base, relation).await?);
                }
                Ok(resources)
            }
        }
    }
}

#[async_trait]
impl Topology for ResourceTopology {
    async fn get_sub_resources(&self, resource: &ResourceRef) -> TopologyResult<Vec<SubResource>> {
        let mut cx = self.bind(resource).await?;
        self.expand(&mut cx, resource).await
    }

    async fn get_peer_resources(&self, resource: &ResourceRef) -> TopologyResult<Vec<ResourceRef>> {
        let mut cx = self.bind(resource).await?;
        self.peers(&mut cx, resource).await
    }
}

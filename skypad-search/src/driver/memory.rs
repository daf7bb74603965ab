//! In-memory graph driver.
//!
//! Keeps nodes in insertion order (which is the "store order" reads report)
//! and relationships in an ordered set, so MERGE semantics fall out of set
//! insertion. Reference similarity is computed client-side with the same
//! cosine function the search engine uses.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use crate::driver::{GraphDriver, NodeFilter, StoredNode};
use crate::edges::{Link, RelationKind};
use crate::errors::{Result, SearchError};
use crate::nodes::{AssetNode, Domain, NodeKey, NodeLabel};
use crate::utils::{cosine_similarity, first_word_lower, same_dimensions};

#[derive(Default)]
struct GraphState {
    nodes: Vec<AssetNode>,
    links: BTreeSet<Link>,
}

impl GraphState {
    fn find(&self, key: &NodeKey) -> Option<&AssetNode> {
        self.nodes
            .iter()
            .find(|n| n.label() == key.label && n.key() == key.key)
    }
}

/// Process-local [`GraphDriver`].
///
/// Besides storage it counts read queries and can be switched offline, which
/// lets callers observe how many store round-trips an operation made and how
/// it behaves when the store is unreachable.
#[derive(Default)]
pub struct InMemoryDriver {
    state: RwLock<GraphState>,
    reads: AtomicUsize,
    offline: AtomicBool,
    closed: AtomicBool,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `nodes`.
    pub fn with_nodes(nodes: impl IntoIterator<Item = AssetNode>) -> Self {
        Self {
            state: RwLock::new(GraphState {
                nodes: nodes.into_iter().collect(),
                links: BTreeSet::new(),
            }),
            ..Self::default()
        }
    }

    /// Number of read queries served (or refused) so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail as if the server were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    /// All relationships of `kind`, in key order.
    pub async fn links(&self, kind: RelationKind) -> Vec<Link> {
        self.state
            .read()
            .await
            .links
            .iter()
            .filter(|l| l.kind == kind)
            .cloned()
            .collect()
    }

    fn check_available(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SearchError::Driver("driver is closed".to_string()));
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(SearchError::Driver("graph store unavailable".to_string()));
        }
        Ok(())
    }

    fn begin_read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }
}

impl GraphDriver for InMemoryDriver {
    async fn ping(&self) -> Result<()> {
        self.check_available()
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_embedded(&self, filter: &NodeFilter) -> Result<Vec<StoredNode>> {
        self.begin_read()?;
        let state = self.state.read().await;
        Ok(state
            .nodes
            .iter()
            .filter(|n| n.embedding().is_some() && filter.matches(n))
            .cloned()
            .map(StoredNode::new)
            .collect())
    }

    async fn text_search(
        &self,
        needle: &str,
        domain: Option<Domain>,
        limit: usize,
    ) -> Result<Vec<StoredNode>> {
        self.begin_read()?;
        let filter = NodeFilter::domain(domain);
        let state = self.state.read().await;
        Ok(state
            .nodes
            .iter()
            .filter(|n| filter.matches(n) && n.description().contains(needle))
            .take(limit)
            .cloned()
            .map(StoredNode::new)
            .collect())
    }

    async fn similar_to(
        &self,
        reference: &NodeKey,
        label: Option<NodeLabel>,
        min_similarity: f32,
        limit: usize,
    ) -> Result<Vec<(StoredNode, f32)>> {
        self.begin_read()?;
        let state = self.state.read().await;

        let Some(query) = state.find(reference).and_then(AssetNode::embedding) else {
            debug!(reference = %reference, "reference has no embedding");
            return Ok(Vec::new());
        };

        let filter = NodeFilter { domain: None, label };
        let mut scored: Vec<(StoredNode, f32)> = state
            .nodes
            .iter()
            .filter(|n| filter.matches(n) && n.node_key() != *reference)
            .filter_map(|n| {
                let candidate = n.embedding()?;
                if !same_dimensions(query, candidate) {
                    return None;
                }
                let score = cosine_similarity(query, candidate);
                (score >= min_similarity).then(|| (StoredNode::new(n.clone()), score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn sample(&self, label: Option<NodeLabel>, limit: usize) -> Result<Vec<StoredNode>> {
        // Store order stands in for random order here.
        self.fetch_embedded(&NodeFilter { domain: None, label })
            .await
            .map(|mut nodes| {
                nodes.truncate(limit);
                nodes
            })
    }

    async fn ensure_schema(&self) -> Result<()> {
        // Uniqueness of natural keys is enforced by `upsert_node`.
        self.check_available()
    }

    async fn clear(&self) -> Result<()> {
        self.check_available()?;
        let mut state = self.state.write().await;
        state.nodes.clear();
        state.links.clear();
        Ok(())
    }

    async fn upsert_node(&self, node: &AssetNode) -> Result<()> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let key = node.node_key();
        match state.nodes.iter_mut().find(|n| n.node_key() == key) {
            Some(existing) => *existing = node.clone(),
            None => state.nodes.push(node.clone()),
        }
        Ok(())
    }

    async fn relate(&self, link: &Link) -> Result<()> {
        self.check_available()?;
        link.validate()?;
        let mut state = self.state.write().await;
        for endpoint in [&link.from, &link.to] {
            if state.find(endpoint).is_none() {
                return Err(SearchError::NodeNotFound(endpoint.to_string()));
            }
        }
        state.links.insert(link.clone());
        Ok(())
    }

    async fn link_projects_to_clients(&self) -> Result<usize> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let mut pending = Vec::new();
        for client in state.nodes.iter().filter_map(|n| match n {
            AssetNode::Client(c) => Some(c),
            _ => None,
        }) {
            let first_word = first_word_lower(&client.name);
            let collection = client
                .collection
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_lowercase);

            for project in state.nodes.iter().filter_map(|n| match n {
                AssetNode::Project(p) => Some(p),
                _ => None,
            }) {
                let project_name = project.name.to_lowercase();
                let mentions = |needle: &Option<String>| {
                    needle.as_deref().is_some_and(|w| project_name.contains(w))
                };
                if mentions(&first_word) || mentions(&collection) {
                    pending.push(Link::has_project(&client.name, &project.name)?);
                }
            }
        }

        let created = pending
            .into_iter()
            .filter(|link| state.links.insert(link.clone()))
            .count();
        Ok(created)
    }
}

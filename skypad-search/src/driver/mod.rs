//! Graph database driver abstraction.
//!
//! Defines the [`GraphDriver`] trait every backend satisfies, plus two
//! implementations:
//! - [`neo4j::Neo4jDriver`] — Neo4j over Bolt, similarity for reference
//!   search computed inside Cypher.
//! - [`memory::InMemoryDriver`] — process-local store used by tests and for
//!   offline experiments.
//!
//! Reads return typed [`StoredNode`]s; row shapes never leave the driver.

pub mod memory;
pub mod neo4j;

use serde::Serialize;

use crate::edges::Link;
use crate::errors::Result;
use crate::nodes::{AssetNode, Domain, NodeKey, NodeLabel};

/// A node as read back from the store, with every label it carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredNode {
    pub node: AssetNode,
    pub labels: Vec<String>,
}

impl StoredNode {
    /// Wrap a node whose only label is its own type label.
    pub fn new(node: AssetNode) -> Self {
        let labels = vec![node.label().as_str().to_string()];
        Self { node, labels }
    }
}

/// Scope for candidate reads. `None` fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub domain: Option<Domain>,
    pub label: Option<NodeLabel>,
}

impl NodeFilter {
    pub fn domain(domain: Option<Domain>) -> Self {
        Self {
            domain,
            label: None,
        }
    }

    pub fn label(label: NodeLabel) -> Self {
        Self {
            domain: None,
            label: Some(label),
        }
    }

    pub fn matches(&self, node: &AssetNode) -> bool {
        self.domain.map_or(true, |d| node.domain() == Some(d))
            && self.label.map_or(true, |l| node.label() == l)
    }
}

/// Trait representing a graph database backend.
///
/// Reads are what search needs; writes are what ingestion needs. Reads are
/// side-effect free.
#[allow(async_fn_in_trait)]
pub trait GraphDriver: Send + Sync {
    /// Health check — verify connectivity to the database.
    async fn ping(&self) -> Result<()>;

    /// Release the connection pool. Later calls fail with a driver error.
    async fn close(&self) -> Result<()>;

    /// Every node matching `filter` that has an embedding, in store order.
    async fn fetch_embedded(&self, filter: &NodeFilter) -> Result<Vec<StoredNode>>;

    /// Nodes whose `description` contains `needle` (case-sensitive), in store
    /// order, at most `limit`.
    async fn text_search(
        &self,
        needle: &str,
        domain: Option<Domain>,
        limit: usize,
    ) -> Result<Vec<StoredNode>>;

    /// Nodes most similar to the stored embedding of `reference`, scored by
    /// the store. Candidates are other embedded nodes of the same
    /// dimensionality (optionally restricted to `label`) scoring at least
    /// `min_similarity`, best first, at most `limit`.
    ///
    /// A reference that is missing or has no embedding yields an empty list.
    async fn similar_to(
        &self,
        reference: &NodeKey,
        label: Option<NodeLabel>,
        min_similarity: f32,
        limit: usize,
    ) -> Result<Vec<(StoredNode, f32)>>;

    /// Up to `limit` embedded nodes, picked arbitrarily.
    async fn sample(&self, label: Option<NodeLabel>, limit: usize) -> Result<Vec<StoredNode>>;

    /// Create natural-key uniqueness constraints and property indexes.
    async fn ensure_schema(&self) -> Result<()>;

    /// Delete every node and relationship.
    async fn clear(&self) -> Result<()>;

    /// Insert a node or overwrite the properties of the one sharing its key.
    async fn upsert_node(&self, node: &AssetNode) -> Result<()>;

    /// Create `link` unless it already exists. Both endpoints must exist.
    async fn relate(&self, link: &Link) -> Result<()>;

    /// Link each client to the projects whose name mentions the client's
    /// first name word or its collection. Returns the number of new links.
    async fn link_projects_to_clients(&self) -> Result<usize>;
}

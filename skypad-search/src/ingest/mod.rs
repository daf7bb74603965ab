//! Ingestion pipeline.
//!
//! Loads a [`Manifest`] into the graph store:
//! 1. **Embed** — nodes without an embedding get one computed from their
//!    description, in a single batched provider call
//! 2. **Upsert** — every node, merged on its natural key
//! 3. **Relate** — every manifest link, then client → project links
//!    inferred from names

mod manifest;

pub use manifest::Manifest;

use serde::Serialize;
use tracing::{info, warn};

use crate::driver::GraphDriver;
use crate::embedder::EmbedderClient;
use crate::errors::Result;
use crate::nodes::AssetNode;

/// Counts of what an [`Ingestor::ingest`] run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub nodes_written: usize,
    pub embeddings_computed: usize,
    /// Nodes stored without an embedding; invisible to semantic search.
    pub nodes_without_embedding: usize,
    pub links_written: usize,
    pub project_links_created: usize,
}

/// Writes manifests to a [`GraphDriver`], embedding descriptions on the way.
pub struct Ingestor<D, E> {
    driver: D,
    embedder: Option<E>,
}

impl<D: GraphDriver, E: EmbedderClient> Ingestor<D, E> {
    pub fn new(driver: D, embedder: Option<E>) -> Self {
        Self { driver, embedder }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Delete everything, then recreate constraints and indexes.
    pub async fn reset(&self) -> Result<()> {
        self.driver.clear().await?;
        self.driver.ensure_schema().await
    }

    /// Write `manifest` to the store.
    ///
    /// Embedding failures are logged and leave the affected nodes without an
    /// embedding; store failures abort the run.
    pub async fn ingest(&self, manifest: Manifest) -> Result<IngestReport> {
        manifest.validate()?;
        let Manifest { mut nodes, links } = manifest;

        let embeddings_computed = self.embed_missing(&mut nodes).await;

        for node in &nodes {
            self.driver.upsert_node(node).await?;
        }
        for link in &links {
            self.driver.relate(link).await?;
        }
        let project_links_created = self.driver.link_projects_to_clients().await?;

        let report = IngestReport {
            nodes_written: nodes.len(),
            embeddings_computed,
            nodes_without_embedding: nodes.iter().filter(|n| n.embedding().is_none()).count(),
            links_written: links.len(),
            project_links_created,
        };
        info!(?report, "ingestion finished");
        Ok(report)
    }

    /// Fill in embeddings for nodes that lack one. Returns how many were set.
    async fn embed_missing(&self, nodes: &mut [AssetNode]) -> usize {
        let pending: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.embedding().is_none() && !n.description().trim().is_empty())
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return 0;
        }

        let Some(embedder) = &self.embedder else {
            warn!(
                nodes = pending.len(),
                "no embedder configured, storing nodes without embeddings"
            );
            return 0;
        };

        let texts: Vec<&str> = pending.iter().map(|&i| nodes[i].description()).collect();
        let embeddings = match embedder.embed_batch(&texts).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                warn!(nodes = pending.len(), error = %e, "embedding failed, storing nodes without embeddings");
                return 0;
            }
        };

        let mut computed = 0;
        for (i, embedding) in pending.into_iter().zip(embeddings) {
            if !embedding.is_empty() {
                nodes[i].set_embedding(Some(embedding));
                computed += 1;
            }
        }
        computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::InMemoryDriver;
    use crate::driver::NodeFilter;
    use crate::edges::{Link, RelationKind};
    use crate::embedder::Embedding;
    use crate::errors::SearchError;
    use crate::nodes::{ClientNode, ImageNode, NodeKey, NodeLabel, ProductNode, ProjectNode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds every text as `[len, 1]`; can be told to fail.
    #[derive(Default)]
    struct LengthEmbedder {
        fail: bool,
        batches: AtomicUsize,
    }

    impl EmbedderClient for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SearchError::Embedder("provider down".to_string()));
            }
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dim(&self) -> usize {
            2
        }

        fn model(&self) -> &str {
            "length"
        }
    }

    fn manifest() -> Manifest {
        let mut pre_embedded = ImageNode::new("/p/P-1.png", "Front view").with_domain(crate::nodes::Domain::Product);
        pre_embedded.embedding_vector = Some(vec![0.5, 0.5]);
        Manifest {
            nodes: vec![
                AssetNode::Client(ClientNode::new("Hilton Worldwide", "Hotel group")),
                AssetNode::Project(ProjectNode::new("Hilton Berlin", "Lobby refit")),
                AssetNode::Product(ProductNode::new("P-1", "Walnut chair")),
                AssetNode::Image(pre_embedded),
            ],
            links: vec![
                Link::has_image(NodeKey::new(NodeLabel::Product, "P-1"), "/p/P-1.png").unwrap(),
            ],
        }
    }

    #[tokio::test]
    async fn ingest_embeds_writes_and_links() {
        let ingestor = Ingestor::new(InMemoryDriver::new(), Some(LengthEmbedder::default()));
        let report = ingestor.ingest(manifest()).await.unwrap();

        assert_eq!(
            report,
            IngestReport {
                nodes_written: 4,
                embeddings_computed: 3,
                nodes_without_embedding: 0,
                links_written: 1,
                project_links_created: 1,
            }
        );
        let driver = ingestor.driver();
        assert_eq!(driver.links(RelationKind::HasImage).await.len(), 1);
        assert_eq!(driver.links(RelationKind::HasProject).await.len(), 1);

        // The pre-computed embedding is kept as is.
        let images = driver
            .fetch_embedded(&NodeFilter::label(NodeLabel::Image))
            .await
            .unwrap();
        assert_eq!(images[0].node.embedding(), Some(&[0.5_f32, 0.5][..]));
    }

    #[tokio::test]
    async fn failing_embedder_still_stores_nodes() {
        let embedder = LengthEmbedder {
            fail: true,
            ..LengthEmbedder::default()
        };
        let ingestor = Ingestor::new(InMemoryDriver::new(), Some(embedder));
        let report = ingestor.ingest(manifest()).await.unwrap();

        assert_eq!(report.nodes_written, 4);
        assert_eq!(report.embeddings_computed, 0);
        assert_eq!(report.nodes_without_embedding, 3);
        assert_eq!(ingestor.driver().node_count().await, 4);
    }

    #[tokio::test]
    async fn without_embedder_nodes_are_text_only() {
        let ingestor: Ingestor<_, LengthEmbedder> = Ingestor::new(InMemoryDriver::new(), None);
        let report = ingestor.ingest(manifest()).await.unwrap();
        assert_eq!(report.nodes_without_embedding, 3);
    }

    #[tokio::test]
    async fn reingesting_is_idempotent() {
        let ingestor = Ingestor::new(InMemoryDriver::new(), Some(LengthEmbedder::default()));
        ingestor.ingest(manifest()).await.unwrap();
        let second = ingestor.ingest(manifest()).await.unwrap();

        assert_eq!(second.project_links_created, 0);
        assert_eq!(ingestor.driver().node_count().await, 4);
        assert_eq!(ingestor.driver().links(RelationKind::HasImage).await.len(), 1);
    }

    #[tokio::test]
    async fn dangling_link_aborts() {
        let mut manifest = manifest();
        manifest
            .links
            .push(Link::has_image(NodeKey::new(NodeLabel::Product, "P-404"), "/p/P-1.png").unwrap());
        let ingestor = Ingestor::new(InMemoryDriver::new(), Some(LengthEmbedder::default()));

        assert!(matches!(
            ingestor.ingest(manifest).await,
            Err(SearchError::NodeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn reset_clears_store() {
        let ingestor = Ingestor::new(InMemoryDriver::new(), Some(LengthEmbedder::default()));
        ingestor.ingest(manifest()).await.unwrap();
        ingestor.reset().await.unwrap();
        assert_eq!(ingestor.driver().node_count().await, 0);
        assert!(ingestor.driver().links(RelationKind::HasProject).await.is_empty());
    }

    #[tokio::test]
    async fn blank_descriptions_are_not_embedded() {
        let embedder = LengthEmbedder::default();
        let ingestor = Ingestor::new(InMemoryDriver::new(), Some(embedder));
        let manifest = Manifest {
            nodes: vec![AssetNode::Product(ProductNode::new("P-9", "  "))],
            links: Vec::new(),
        };
        let report = ingestor.ingest(manifest).await.unwrap();

        assert_eq!(report.nodes_without_embedding, 1);
        let batches = match &ingestor.embedder {
            Some(e) => e.batches.load(Ordering::SeqCst),
            None => 0,
        };
        assert_eq!(batches, 0);
    }
}

//! The search orchestrator.

use std::future::Future;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::driver::{GraphDriver, NodeFilter, StoredNode};
use crate::embedder::{Embedding, EmbedderClient};
use crate::errors::{Result, SearchError};
use crate::nodes::{Domain, NodeKey, NodeLabel};
use crate::search::rank::{rank, Cutoff};
use crate::search::results::{ScoredResult, SmartSearchResults};
use crate::search::router::detect_domain;
use crate::types::SearchConfig;

/// Semantic search over the asset graph.
///
/// Every public search method is best-effort: store failures and timeouts
/// are logged and produce empty results, and a missing or failing embedder
/// degrades free-text search to substring matching.
pub struct SearchEngine<D, E> {
    driver: D,
    embedder: Option<E>,
    config: SearchConfig,
}

impl<D: GraphDriver, E: EmbedderClient> SearchEngine<D, E> {
    /// `embedder` is `None` when no embedding provider is configured.
    pub fn new(driver: D, embedder: Option<E>, config: SearchConfig) -> Self {
        Self {
            driver,
            embedder,
            config,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Release the underlying store connection.
    pub async fn close(&self) -> Result<()> {
        self.driver.close().await
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = self.config.request_timeout;
        timeout(limit, fut)
            .await
            .map_err(|_| SearchError::Timeout(limit))?
    }

    /// Embed `query`, or `None` when semantic scoring is unavailable.
    async fn query_embedding(&self, query: &str) -> Option<Embedding> {
        let Some(embedder) = &self.embedder else {
            debug!("no embedder configured");
            return None;
        };
        match self.bounded(embedder.embed(query)).await {
            Ok(embedding) if !embedding.is_empty() => Some(embedding),
            Ok(_) => {
                warn!(query = %query, "embedder returned an empty vector");
                None
            }
            Err(e) => {
                warn!(query = %query, error = %e, "query embedding failed");
                None
            }
        }
    }

    async fn fetch_candidates(&self, filter: NodeFilter) -> Option<Vec<StoredNode>> {
        match self.bounded(self.driver.fetch_embedded(&filter)).await {
            Ok(candidates) => Some(candidates),
            Err(e) => {
                warn!(error = %e, domain = ?filter.domain, label = ?filter.label, "candidate fetch failed");
                None
            }
        }
    }

    /// Substring match of `query` against descriptions, every hit scored
    /// with the fallback constant.
    async fn text_fallback(
        &self,
        query: &str,
        domain: Option<Domain>,
        limit: usize,
    ) -> Vec<ScoredResult> {
        match self
            .bounded(self.driver.text_search(query, domain, limit))
            .await
        {
            Ok(hits) => {
                info!(query = %query, domain = ?domain, hits = hits.len(), "text fallback search");
                hits.into_iter()
                    .map(|hit| ScoredResult::text_match(hit, self.config.fallback_score))
                    .collect()
            }
            Err(e) => {
                warn!(query = %query, domain = ?domain, error = %e, "text fallback search failed");
                Vec::new()
            }
        }
    }

    /// Rank nodes (optionally of one domain) by similarity to `query`.
    ///
    /// Keeps scores strictly above `domain_threshold`, best first, at most
    /// `limit`. Without a query embedding, falls back to substring matching.
    pub async fn search_by_domain(
        &self,
        query: &str,
        domain: Option<Domain>,
        limit: usize,
    ) -> Vec<ScoredResult> {
        let Some(embedding) = self.query_embedding(query).await else {
            return self.text_fallback(query, domain, limit).await;
        };
        let Some(candidates) = self.fetch_candidates(NodeFilter::domain(domain)).await else {
            return Vec::new();
        };

        let scanned = candidates.len();
        let results = rank(
            &embedding,
            candidates,
            Cutoff::Above(self.config.domain_threshold),
            limit,
        );
        info!(
            query = %query,
            domain = ?domain,
            scanned,
            results = results.len(),
            "semantic search"
        );
        results
    }

    /// Route `query` to a domain when its wording suggests one, falling back
    /// to an unscoped search grouped by domain.
    pub async fn smart_search(&self, query: &str, limit: usize) -> SmartSearchResults {
        if let Some(domain) = detect_domain(query) {
            let results = self.search_by_domain(query, Some(domain), limit).await;
            let top = results.first().map(|r| r.similarity_score);
            if top.is_some_and(|score| score > self.config.early_exit_score) {
                debug!(domain = %domain, top = ?top, "domain-scoped results accepted");
                return SmartSearchResults::domain_scoped(domain, results);
            }
            debug!(domain = %domain, top = ?top, "weak domain-scoped results, searching globally");
        }

        let results = self.search_by_domain(query, None, limit).await;
        SmartSearchResults::global(results)
    }

    /// Rank images by similarity to `query`, keeping scores at or above
    /// `min_similarity` (default `image_threshold`).
    ///
    /// There is no text fallback: without a query embedding the result is
    /// empty.
    pub async fn search_images(
        &self,
        query: &str,
        limit: usize,
        min_similarity: Option<f32>,
    ) -> Vec<ScoredResult> {
        let threshold = min_similarity.unwrap_or(self.config.image_threshold);
        let Some(embedding) = self.query_embedding(query).await else {
            warn!(query = %query, "image search needs a query embedding");
            return Vec::new();
        };
        let Some(candidates) = self.fetch_candidates(NodeFilter::label(NodeLabel::Image)).await
        else {
            return Vec::new();
        };

        let results = rank(&embedding, candidates, Cutoff::AtLeast(threshold), limit);
        info!(query = %query, threshold, results = results.len(), "image search");
        results
    }

    /// Nodes most similar to the stored embedding of `reference`, scored by
    /// the store. Empty when the reference is missing or has no embedding.
    pub async fn find_similar(&self, reference: &NodeKey, limit: usize) -> Vec<ScoredResult> {
        self.similar(reference, None, limit).await
    }

    /// Images most similar to the image stored at `path`.
    pub async fn find_similar_images(&self, path: &str, limit: usize) -> Vec<ScoredResult> {
        let reference = NodeKey::new(NodeLabel::Image, path);
        self.similar(&reference, Some(NodeLabel::Image), limit)
            .await
    }

    async fn similar(
        &self,
        reference: &NodeKey,
        label: Option<NodeLabel>,
        limit: usize,
    ) -> Vec<ScoredResult> {
        let lookup = self.driver.similar_to(
            reference,
            label,
            self.config.reference_threshold,
            limit,
        );
        match self.bounded(lookup).await {
            Ok(hits) => {
                info!(reference = %reference, results = hits.len(), "reference search");
                hits.into_iter()
                    .map(|(hit, score)| ScoredResult::semantic(hit, score))
                    .collect()
            }
            Err(e) => {
                warn!(reference = %reference, error = %e, "reference search failed");
                Vec::new()
            }
        }
    }

    /// Up to `limit` arbitrary embedded nodes, e.g. to pick a reference for
    /// [`Self::find_similar`].
    pub async fn sample(&self, label: Option<NodeLabel>, limit: usize) -> Vec<StoredNode> {
        match self.bounded(self.driver.sample(label, limit)).await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(label = ?label, error = %e, "sampling failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::InMemoryDriver;
    use crate::embedder::openai::OpenAiEmbedder;
    use crate::nodes::{AssetNode, ProductNode};

    fn engine_without_embedder(driver: InMemoryDriver) -> SearchEngine<InMemoryDriver, OpenAiEmbedder> {
        SearchEngine::new(driver, None, SearchConfig::default())
    }

    #[tokio::test]
    async fn missing_embedder_uses_text_fallback() {
        let driver = InMemoryDriver::with_nodes([
            AssetNode::Product(ProductNode::new("P-1", "Walnut chair")),
            AssetNode::Product(ProductNode::new("P-2", "Oak table")),
        ]);
        let engine = engine_without_embedder(driver);

        let results = engine.search_by_domain("chair", None, 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].node.key(), "P-1");
        assert_eq!(results[0].similarity_score, 0.5);
        assert_eq!(results[0].match_kind, crate::search::MatchKind::TextMatch);
    }

    #[tokio::test]
    async fn image_search_without_embedder_is_empty() {
        let engine = engine_without_embedder(InMemoryDriver::new());
        assert!(engine.search_images("lobby", 10, None).await.is_empty());
        assert_eq!(engine.driver().read_count(), 0);
    }

    #[tokio::test]
    async fn closed_store_yields_empty_sample() {
        let engine = engine_without_embedder(InMemoryDriver::new());
        engine.close().await.unwrap();
        assert!(engine.sample(None, 5).await.is_empty());
    }
}

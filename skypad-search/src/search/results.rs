//! Result types returned by the search engine.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::driver::StoredNode;
use crate::nodes::{AssetNode, Domain};

/// Group key for results whose node has no domain.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// How a result's score was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Cosine similarity between the query and the node embedding.
    Semantic,
    /// Plain substring match; the score is the configured constant.
    TextMatch,
}

/// A node paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub node: AssetNode,
    pub labels: Vec<String>,
    pub similarity_score: f32,
    pub match_kind: MatchKind,
}

impl ScoredResult {
    pub fn semantic(stored: StoredNode, score: f32) -> Self {
        Self::from_stored(stored, score, MatchKind::Semantic)
    }

    pub fn text_match(stored: StoredNode, score: f32) -> Self {
        Self::from_stored(stored, score, MatchKind::TextMatch)
    }

    fn from_stored(stored: StoredNode, similarity_score: f32, match_kind: MatchKind) -> Self {
        Self {
            node: stored.node,
            labels: stored.labels,
            similarity_score,
            match_kind,
        }
    }

    /// Group key for this result: its domain name or [`UNKNOWN_DOMAIN`].
    pub fn domain_key(&self) -> &'static str {
        self.node.domain().map_or(UNKNOWN_DOMAIN, Domain::as_str)
    }
}

/// Which path [`crate::search::SearchEngine::smart_search`] answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "domain", rename_all = "snake_case")]
pub enum SearchStrategy {
    /// The detected domain's results were good enough on their own.
    DomainScoped(Domain),
    /// Results come from an unscoped search, grouped by node domain.
    Global,
}

/// Results keyed by domain name. Empty groups are never present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartSearchResults {
    pub strategy: SearchStrategy,
    pub groups: BTreeMap<String, Vec<ScoredResult>>,
}

impl SmartSearchResults {
    pub fn domain_scoped(domain: Domain, results: Vec<ScoredResult>) -> Self {
        let mut groups = BTreeMap::new();
        if !results.is_empty() {
            groups.insert(domain.as_str().to_string(), results);
        }
        Self {
            strategy: SearchStrategy::DomainScoped(domain),
            groups,
        }
    }

    pub fn global(results: Vec<ScoredResult>) -> Self {
        Self {
            strategy: SearchStrategy::Global,
            groups: group_by_domain(results),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of results across all groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Partition ranked `results` by domain, keeping rank order within groups.
pub fn group_by_domain(results: Vec<ScoredResult>) -> BTreeMap<String, Vec<ScoredResult>> {
    let mut groups: BTreeMap<String, Vec<ScoredResult>> = BTreeMap::new();
    for result in results {
        groups
            .entry(result.domain_key().to_string())
            .or_default()
            .push(result);
    }
    groups
}

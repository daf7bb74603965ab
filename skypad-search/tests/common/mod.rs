//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use skypad_search::driver::memory::InMemoryDriver;
use skypad_search::embedder::{Embedding, EmbedderClient};
use skypad_search::nodes::{AssetNode, ClientNode, Domain, ImageNode, ProductNode, ProjectNode};
use skypad_search::search::SearchEngine;
use skypad_search::types::SearchConfig;
use skypad_search::{Result, SearchError};

/// Embedder backed by a fixed query → vector table. Unknown texts fail.
#[derive(Default)]
pub struct TableEmbedder {
    table: HashMap<String, Embedding>,
    delay: Option<Duration>,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, Embedding)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            delay: None,
        }
    }

    /// Sleep `delay` before answering each call.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl EmbedderClient for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.table
            .get(text)
            .cloned()
            .ok_or_else(|| SearchError::Embedder(format!("no vector for {text:?}")))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dim(&self) -> usize {
        2
    }

    fn model(&self) -> &str {
        "table"
    }
}

/// Unit vector whose cosine with `[1, 0]` is exactly `score`.
pub fn at(score: f32) -> Embedding {
    vec![score, (1.0 - score * score).max(0.0).sqrt()]
}

pub fn embedded(mut node: AssetNode, embedding: Embedding) -> AssetNode {
    node.set_embedding(Some(embedding));
    node
}

pub fn product(id: &str, description: &str, embedding: Embedding) -> AssetNode {
    embedded(AssetNode::Product(ProductNode::new(id, description)), embedding)
}

pub fn client(name: &str, description: &str, embedding: Embedding) -> AssetNode {
    embedded(AssetNode::Client(ClientNode::new(name, description)), embedding)
}

pub fn project(name: &str, description: &str, embedding: Embedding) -> AssetNode {
    embedded(AssetNode::Project(ProjectNode::new(name, description)), embedding)
}

pub fn image(path: &str, description: &str, domain: Option<Domain>, embedding: Embedding) -> AssetNode {
    let mut node = ImageNode::new(path, description);
    node.domain = domain;
    embedded(AssetNode::Image(node), embedding)
}

pub fn engine(
    nodes: impl IntoIterator<Item = AssetNode>,
    embedder: Option<TableEmbedder>,
) -> SearchEngine<InMemoryDriver, TableEmbedder> {
    SearchEngine::new(
        InMemoryDriver::with_nodes(nodes),
        embedder,
        SearchConfig::default(),
    )
}

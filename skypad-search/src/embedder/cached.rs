//! Caching decorator for embedder clients.
//!
//! Interactive search tends to repeat the same handful of queries; caching
//! their vectors avoids a provider round-trip per repeat.

use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::embedder::{Embedding, EmbedderClient};
use crate::errors::Result;
use crate::utils::{cache_key, normalize_whitespace};

/// Configuration for the in-process embedding cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries held in memory.
    pub max_capacity: u64,
    /// How long each entry lives before eviction.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl: Duration::from_secs(3_600),
        }
    }
}

/// [`EmbedderClient`] that serves repeated texts from a `moka` cache.
///
/// Keys are `md5(model, normalized text)`, so whitespace variations of the
/// same query share an entry. Failed calls are not cached.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Cache<String, Embedding>,
}

impl<E: EmbedderClient> CachedEmbedder<E> {
    pub fn new(inner: E, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();
        Self { inner, cache }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn key(&self, normalized: &str) -> String {
        cache_key(&[self.inner.model(), normalized])
    }
}

impl<E: EmbedderClient> EmbedderClient for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let normalized = normalize_whitespace(text);
        let key = self.key(&normalized);

        if let Some(cached) = self.cache.get(&key).await {
            debug!("embedding cache hit");
            return Ok(cached);
        }

        let embedding = self.inner.embed(&normalized).await?;
        self.cache.insert(key, embedding.clone()).await;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let normalized: Vec<String> = texts.iter().map(|t| normalize_whitespace(t)).collect();
        let keys: Vec<String> = normalized.iter().map(|t| self.key(t)).collect();

        let mut slots: Vec<Option<Embedding>> = Vec::with_capacity(texts.len());
        for key in &keys {
            slots.push(self.cache.get(key).await);
        }

        let missing: Vec<usize> = (0..slots.len()).filter(|&i| slots[i].is_none()).collect();
        if !missing.is_empty() {
            let inputs: Vec<&str> = missing.iter().map(|&i| normalized[i].as_str()).collect();
            let fresh = self.inner.embed_batch(&inputs).await?;
            for (&i, embedding) in missing.iter().zip(fresh) {
                self.cache.insert(keys[i].clone(), embedding.clone()).await;
                slots[i] = Some(embedding);
            }
        }

        debug!(
            total = texts.len(),
            hits = texts.len() - missing.len(),
            "embedding batch served"
        );
        Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}

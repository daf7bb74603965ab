//! Embedder client abstraction.
//!
//! Turns free text into fixed-length dense vectors. Search treats the
//! provider as optional: when none is configured, or a call fails, queries
//! fall back to plain text matching.
//!
//! # Implementations
//! - [`openai::OpenAiEmbedder`] — OpenAI embeddings API via `async-openai`.
//! - [`cached::CachedEmbedder`] — in-process cache in front of any client.

pub mod cached;
pub mod openai;

use crate::errors::Result;

/// A vector embedding (f32 components).
pub type Embedding = Vec<f32>;

/// Trait for text-to-vector embedding clients.
#[allow(async_fn_in_trait)]
pub trait EmbedderClient: Send + Sync {
    /// Generate an embedding for a single text string.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for a batch of texts, one per input, in order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Dimensionality of embeddings produced by this client.
    fn dim(&self) -> usize;

    /// Model identifier, used to namespace cached vectors.
    fn model(&self) -> &str;
}

//! OpenAI embedding client implementation.
//!
//! Wraps [`async_openai`] to provide [`EmbedderClient`] for the OpenAI
//! Embeddings API, with chunked batch support and bounded exponential-backoff
//! retry on transient network failures.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::CreateEmbeddingRequestArgs,
    Client,
};
use backoff::{future::retry, ExponentialBackoffBuilder};
use std::time::Duration;
use tracing::{debug, warn};

use crate::embedder::{Embedding, EmbedderClient};
use crate::errors::{Result, SearchError};

/// Default embedding model name.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Maximum number of inputs per OpenAI embeddings API call.
const BATCH_CHUNK_SIZE: usize = 2048;

/// Default total time spent retrying a single call.
const DEFAULT_RETRY_BUDGET: Duration = Duration::from_secs(20);

/// Return the embedding dimension for a given model name.
///
/// Falls back to 1536 (the `text-embedding-3-small` dimension) for
/// unrecognised models.
fn model_dim(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

/// Timeouts and refused connections are retried; everything else
/// (authentication, bad requests, quota) fails immediately.
fn classify_error(err: OpenAIError) -> backoff::Error<SearchError> {
    let msg = err.to_string();
    match &err {
        OpenAIError::Reqwest(e) if e.is_timeout() || e.is_connect() => {
            warn!(error = %msg, "transient embeddings API failure, retrying");
            backoff::Error::transient(SearchError::Embedder(msg))
        }
        _ => backoff::Error::permanent(SearchError::Embedder(msg)),
    }
}

/// OpenAI embedding client that implements [`EmbedderClient`].
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dim: usize,
    retry_budget: Duration,
}

impl OpenAiEmbedder {
    /// Create a new embedder.
    ///
    /// # Arguments
    /// * `api_key` – OpenAI API key (`sk-…`).
    /// * `model`   – Embedding model name (e.g. [`DEFAULT_MODEL`]).
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self::from_config(config, model.into())
    }

    /// Create an embedder against an OpenAI-compatible endpoint.
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(base_url.into());
        Self::from_config(config, model.into())
    }

    /// Override the total retry budget per API call (default 20 s).
    pub fn with_retry_budget(mut self, budget: Duration) -> Self {
        self.retry_budget = budget;
        self
    }

    fn from_config(config: OpenAIConfig, model: String) -> Self {
        let dim = model_dim(&model);
        Self {
            client: Client::with_config(config),
            model,
            dim,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    /// Issue a single embeddings API call for up to [`BATCH_CHUNK_SIZE`] texts.
    ///
    /// Retries transient failures with exponential back-off
    /// (initial 250 ms, cap 5 s, total budget `retry_budget`).
    async fn embed_chunk(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let backoff_policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(250))
            .with_max_interval(Duration::from_secs(5))
            .with_max_elapsed_time(Some(self.retry_budget))
            .build();

        let input: Vec<String> = texts.iter().map(|s| (*s).to_owned()).collect();
        let model = self.model.clone();
        let client = self.client.clone();

        debug!(model = %self.model, inputs = input.len(), "requesting embeddings");

        retry(backoff_policy, move || {
            let input = input.clone();
            let model = model.clone();
            let client = client.clone();
            async move {
                let request = CreateEmbeddingRequestArgs::default()
                    .model(model.as_str())
                    .input(input)
                    .build()
                    .map_err(|e| backoff::Error::permanent(SearchError::Embedder(e.to_string())))?;

                let response = client
                    .embeddings()
                    .create(request)
                    .await
                    .map_err(classify_error)?;

                let mut data = response.data;
                data.sort_by_key(|item| item.index);
                Ok(data
                    .into_iter()
                    .map(|item| item.embedding.into_iter().map(|x| x as f32).collect())
                    .collect())
            }
        })
        .await
    }
}

impl EmbedderClient for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut embeddings = self.embed_chunk(&[text]).await?;
        embeddings
            .pop()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SearchError::Embedder("empty response from embedding API".to_string()))
    }

    /// Embed multiple texts, splitting into chunks of at most
    /// [`BATCH_CHUNK_SIZE`] items to respect OpenAI's per-call limits.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut result = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_CHUNK_SIZE) {
            let chunk_embeddings = self.embed_chunk(chunk).await?;
            if chunk_embeddings.len() != chunk.len() {
                return Err(SearchError::Embedder(format!(
                    "expected {} embeddings, got {}",
                    chunk.len(),
                    chunk_embeddings.len()
                )));
            }
            result.extend(chunk_embeddings);
        }
        Ok(result)
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn model(&self) -> &str {
        &self.model
    }
}

//! Command handlers. Each opens its own store connection and releases it
//! before returning, whether or not the command succeeded.

use std::path::Path;

use tracing::{error, info, warn};

use skypad_search::driver::neo4j::Neo4jDriver;
use skypad_search::driver::GraphDriver;
use skypad_search::embedder::cached::{CacheConfig, CachedEmbedder};
use skypad_search::embedder::openai::OpenAiEmbedder;
use skypad_search::ingest::{IngestReport, Ingestor, Manifest};
use skypad_search::nodes::{Domain, NodeKey, NodeLabel};
use skypad_search::search::SearchEngine;
use skypad_search::types::SkypadConfig;

use crate::output;
use crate::Commands;

/// Options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub limit: usize,
    pub json: bool,
}

type Engine = SearchEngine<Neo4jDriver, CachedEmbedder<OpenAiEmbedder>>;

/// Split `skypad search` words into an optional leading domain and the query.
///
/// The first word only counts as a domain when more words follow, so a
/// lone `product` is searched for as text.
pub fn split_domain(words: &[String]) -> (Option<Domain>, String) {
    match words {
        [first, rest @ ..] if !rest.is_empty() => match first.parse::<Domain>() {
            Ok(domain) => (Some(domain), rest.join(" ")),
            Err(_) => (None, words.join(" ")),
        },
        _ => (None, words.join(" ")),
    }
}

fn openai_embedder(config: &SkypadConfig) -> Option<OpenAiEmbedder> {
    match &config.openai_api_key {
        Some(key) => Some(OpenAiEmbedder::new(key, &config.embedding_model)),
        None => {
            warn!("OPENAI_API_KEY not set, semantic scoring disabled");
            None
        }
    }
}

fn query_embedder(config: &SkypadConfig) -> Option<CachedEmbedder<OpenAiEmbedder>> {
    openai_embedder(config).map(|embedder| {
        let cache = CacheConfig {
            max_capacity: config.embedding_cache_capacity,
            ..CacheConfig::default()
        };
        CachedEmbedder::new(embedder, cache)
    })
}

async fn connect(config: &SkypadConfig) -> anyhow::Result<Neo4jDriver> {
    Neo4jDriver::connect(config).await.map_err(|e| {
        error!(uri = %config.neo4j_uri, error = %e, "cannot connect to neo4j");
        anyhow::anyhow!("Cannot connect to Neo4j at {}: {e}", config.neo4j_uri)
    })
}

async fn release(driver: &impl GraphDriver) {
    if let Err(e) = driver.close().await {
        warn!(error = %e, "failed to close neo4j connection");
    }
}

pub async fn run(command: Commands, options: Options, config: &SkypadConfig) -> anyhow::Result<()> {
    match command {
        Commands::Ingest { manifest, reset } => ingest(&manifest, reset, options, config).await,
        Commands::InitSchema => {
            let driver = connect(config).await?;
            let outcome = driver.ensure_schema().await;
            release(&driver).await;
            outcome?;
            println!("Schema constraints and indexes are in place.");
            Ok(())
        }
        command => {
            let engine = SearchEngine::new(
                connect(config).await?,
                query_embedder(config),
                config.search_config(),
            );
            let outcome = search(&engine, command, options).await;
            release(engine.driver()).await;
            outcome
        }
    }
}

async fn search(engine: &Engine, command: Commands, options: Options) -> anyhow::Result<()> {
    let Options { limit, json } = options;
    match command {
        Commands::Search { words } => {
            let (domain, query) = split_domain(&words);
            info!(query = %query, domain = ?domain, limit, "search");
            match domain {
                Some(domain) => {
                    let results = engine.search_by_domain(&query, Some(domain), limit).await;
                    output::results(&results, json)
                }
                None => output::smart(&engine.smart_search(&query, limit).await, json),
            }
        }
        Commands::Similar { label, key } => {
            let reference = NodeKey::new(label, key);
            let results = match label {
                NodeLabel::Image => engine.find_similar_images(&reference.key, limit).await,
                _ => engine.find_similar(&reference, limit).await,
            };
            output::results(&results, json)
        }
        Commands::Images {
            words,
            min_similarity,
        } => {
            let results = engine
                .search_images(&words.join(" "), limit, min_similarity)
                .await;
            output::results(&results, json)
        }
        Commands::Sample { label } => output::nodes(&engine.sample(label, limit).await, json),
        Commands::Ingest { .. } | Commands::InitSchema => {
            anyhow::bail!("not a search command")
        }
    }
}

async fn ingest(
    manifest: &Path,
    reset: bool,
    options: Options,
    config: &SkypadConfig,
) -> anyhow::Result<()> {
    // Parse before connecting so a bad file never touches the store.
    let manifest = Manifest::from_path(manifest).map_err(|e| {
        error!(path = %manifest.display(), error = %e, "cannot load manifest");
        anyhow::anyhow!("Cannot load manifest {}: {e}", manifest.display())
    })?;

    let ingestor = Ingestor::new(connect(config).await?, openai_embedder(config));
    let outcome = load(&ingestor, manifest, reset).await;
    release(ingestor.driver()).await;

    output::report(&outcome?, options.json)
}

async fn load(
    ingestor: &Ingestor<Neo4jDriver, OpenAiEmbedder>,
    manifest: Manifest,
    reset: bool,
) -> skypad_search::Result<IngestReport> {
    if reset {
        ingestor.reset().await?;
    }
    ingestor.ingest(manifest).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn leading_domain_word_scopes_the_search() {
        assert_eq!(
            split_domain(&words("product modern chair")),
            (Some(Domain::Product), "modern chair".to_string())
        );
        assert_eq!(
            split_domain(&words("Client Acme")),
            (Some(Domain::Client), "Acme".to_string())
        );
    }

    #[test]
    fn lone_domain_word_is_a_query() {
        assert_eq!(split_domain(&words("project")), (None, "project".to_string()));
    }

    #[test]
    fn other_words_go_to_smart_search() {
        assert_eq!(
            split_domain(&words("hotel lobby")),
            (None, "hotel lobby".to_string())
        );
        assert_eq!(split_domain(&[]), (None, String::new()));
    }
}

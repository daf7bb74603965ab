//! # skypad-search
//!
//! Embedding-based semantic search over a Neo4j graph of business assets:
//! clients, products, projects and images.
//!
//! ## Architecture
//!
//! - **Typed nodes**: every asset is an [`nodes::AssetNode`] keyed by its
//!   natural key, with an optional description embedding
//! - **Domain routing**: free-text queries are scoped to a domain when their
//!   wording suggests one ([`search::detect_domain`])
//! - **Graceful degradation**: without an embedding provider, searches fall
//!   back to substring matching; store failures yield empty results
//! - **Ingestion**: manifests of nodes and links are embedded and merged into
//!   the store ([`ingest::Ingestor`])

pub mod edges;
pub mod errors;
pub mod nodes;
pub mod types;

pub mod driver;
pub mod embedder;

pub mod ingest;
pub mod search;

pub mod utils;

pub use errors::{Result, SearchError};
pub use search::SearchEngine;

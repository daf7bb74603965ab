mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use skypad_search::nodes::NodeLabel;

use crate::commands::Options;
use crate::config::LogFormat;

#[derive(Parser)]
#[command(name = "skypad")]
#[command(author, version, about = "Semantic search over the Skypad asset graph", long_about = None)]
struct Cli {
    /// Maximum number of results
    #[arg(long, global = true, default_value_t = 10)]
    limit: usize,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search all assets; a leading client|product|project word scopes the search
    Search {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Find assets similar to a stored one
    Similar {
        /// Node label (Client, Product, Project or Image)
        label: NodeLabel,

        /// Natural key: name, product id or image path
        key: String,
    },

    /// Search images only
    Images {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,

        /// Minimum similarity to keep (default 0.15)
        #[arg(long)]
        min_similarity: Option<f32>,
    },

    /// List a few embedded assets, e.g. to pick a reference for `similar`
    Sample {
        #[arg(long)]
        label: Option<NodeLabel>,
    },

    /// Load a JSON manifest of nodes and links
    Ingest {
        manifest: PathBuf,

        /// Delete everything and recreate the schema first
        #[arg(long)]
        reset: bool,
    },

    /// Create uniqueness constraints and indexes
    InitSchema,
}

fn init_logging(verbose: bool, format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("skypad=debug,skypad_search=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("skypad=info,skypad_search=info"))
    };

    // Logs go to stderr so `--json` output on stdout stays parseable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, LogFormat::from_env());

    let config = config::load().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;
    info!(uri = %config.neo4j_uri, semantic = config.openai_api_key.is_some(), "configuration loaded");

    let options = Options {
        limit: cli.limit,
        json: cli.json,
    };
    commands::run(cli.command, options, &config)
        .await
        .map_err(|e| {
            error!("{}", e);
            e
        })
}

//! Neo4j graph driver implementation.
//!
//! Uses `neo4rs` 0.8 for async, pooled Bolt connections. One [`Graph`] pool
//! is opened per process by [`Neo4jDriver::connect`] and released by
//! [`GraphDriver::close`] (or when the driver is dropped).

mod queries;
mod record;

use std::sync::Mutex;

use neo4rs::{query, ConfigBuilder, Graph, Query, Row};
use tracing::{debug, info, warn};

use crate::driver::{GraphDriver, NodeFilter, StoredNode};
use crate::edges::Link;
use crate::errors::{Result, SearchError};
use crate::nodes::{AssetNode, Domain, NodeKey, NodeLabel};
use crate::types::SkypadConfig;

/// Neo4j-backed [`GraphDriver`].
pub struct Neo4jDriver {
    graph: Mutex<Option<Graph>>,
}

impl Neo4jDriver {
    /// Open the connection pool described by `config` and verify it answers.
    ///
    /// There is no fallback store, so any failure here is returned rather
    /// than degraded.
    pub async fn connect(config: &SkypadConfig) -> Result<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(config.neo4j_uri.as_str())
            .user(config.neo4j_user.as_str())
            .password(config.neo4j_password.as_str());
        if let Some(db) = &config.neo4j_database {
            builder = builder.db(db.as_str());
        }

        let graph = Graph::connect(builder.build()?).await?;
        let driver = Self {
            graph: Mutex::new(Some(graph)),
        };
        driver.ping().await?;

        info!(uri = %config.neo4j_uri, "connected to neo4j");
        Ok(driver)
    }

    /// Cheap handle to the pool; `Graph` clones share connections.
    fn graph(&self) -> Result<Graph> {
        self.graph
            .lock()
            .map_err(|_| SearchError::Driver("connection lock poisoned".to_string()))?
            .clone()
            .ok_or_else(|| SearchError::Driver("driver is closed".to_string()))
    }

    async fn rows(&self, q: Query) -> Result<Vec<Row>> {
        let graph = self.graph()?;
        let mut stream = graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn run(&self, q: Query) -> Result<()> {
        self.graph()?.run(q).await?;
        Ok(())
    }

    async fn count(&self, q: Query, column: &str) -> Result<usize> {
        let rows = self.rows(q).await?;
        let value: i64 = match rows.first() {
            Some(row) => row.get(column)?,
            None => 0,
        };
        Ok(usize::try_from(value).unwrap_or(0))
    }
}

fn with_domain(q: Query, domain: Option<Domain>) -> Query {
    match domain {
        Some(d) => q.param("domain", d.as_str()),
        None => q,
    }
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl GraphDriver for Neo4jDriver {
    async fn ping(&self) -> Result<()> {
        self.run(query(queries::PING)).await
    }

    async fn close(&self) -> Result<()> {
        let previous = self
            .graph
            .lock()
            .map_err(|_| SearchError::Driver("connection lock poisoned".to_string()))?
            .take();
        if previous.is_some() {
            info!("neo4j connection pool released");
        }
        Ok(())
    }

    async fn fetch_embedded(&self, filter: &NodeFilter) -> Result<Vec<StoredNode>> {
        let cypher = queries::fetch_embedded(filter.label, filter.domain.is_some());
        let rows = self.rows(with_domain(query(&cypher), filter.domain)).await?;
        debug!(rows = rows.len(), "fetched embedded candidates");
        Ok(record::stored_nodes(&rows))
    }

    async fn text_search(
        &self,
        needle: &str,
        domain: Option<Domain>,
        limit: usize,
    ) -> Result<Vec<StoredNode>> {
        let q = query(&queries::text_search(domain.is_some()))
            .param("needle", needle)
            .param("limit", limit_param(limit));
        let rows = self.rows(with_domain(q, domain)).await?;
        Ok(record::stored_nodes(&rows))
    }

    async fn similar_to(
        &self,
        reference: &NodeKey,
        label: Option<NodeLabel>,
        min_similarity: f32,
        limit: usize,
    ) -> Result<Vec<(StoredNode, f32)>> {
        let q = query(&queries::similar_to(reference.label, label))
            .param("key", reference.key.as_str())
            .param("min_similarity", f64::from(min_similarity))
            .param("limit", limit_param(limit));
        let rows = self.rows(q).await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in &rows {
            let decoded = record::stored_node(row).and_then(|node| {
                let similarity: f64 = row.get("similarity")?;
                Ok((node, similarity as f32))
            });
            match decoded {
                Ok(hit) => scored.push(hit),
                Err(e) => warn!(error = %e, "skipping undecodable similarity row"),
            }
        }
        Ok(scored)
    }

    async fn sample(&self, label: Option<NodeLabel>, limit: usize) -> Result<Vec<StoredNode>> {
        let q = query(&queries::sample(label)).param("limit", limit_param(limit));
        let rows = self.rows(q).await?;
        Ok(record::stored_nodes(&rows))
    }

    async fn ensure_schema(&self) -> Result<()> {
        let mut statements = Vec::new();
        for label in NodeLabel::ALL {
            statements.push(queries::key_constraint(label));
            statements.push(queries::property_index(label, "description"));
            statements.push(queries::property_index(label, "domain"));
        }
        // The embedding array is deliberately left unindexed: it exceeds
        // Neo4j's index key size limit.
        for statement in statements {
            if let Err(e) = self.run(query(&statement)).await {
                warn!(statement = %statement, error = %e, "schema statement failed");
            }
        }
        info!("schema constraints and indexes ensured");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.run(query(queries::CLEAR)).await?;
        info!("graph cleared");
        Ok(())
    }

    async fn upsert_node(&self, node: &AssetNode) -> Result<()> {
        let q = record::bind_upsert(query(&queries::upsert(node.label())), node);
        self.run(q).await?;
        debug!(node = %node.node_key(), "node upserted");
        Ok(())
    }

    async fn relate(&self, link: &Link) -> Result<()> {
        link.validate()?;
        let q = query(&queries::relate(link.kind, link.from.label, link.to.label))
            .param("from", link.from.key.as_str())
            .param("to", link.to.key.as_str());
        if self.count(q, "linked").await? == 0 {
            return Err(SearchError::NodeNotFound(format!(
                "{} or {}",
                link.from, link.to
            )));
        }
        Ok(())
    }

    async fn link_projects_to_clients(&self) -> Result<usize> {
        let created = self
            .count(query(queries::LINK_PROJECTS_TO_CLIENTS), "created")
            .await?;
        info!(created, "linked projects to clients");
        Ok(created)
    }
}

//! Conversion between Neo4j rows and typed nodes.

use chrono::NaiveDate;
use neo4rs::{BoltNull, BoltType, Query, Row};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::driver::StoredNode;
use crate::errors::{Result, SearchError};
use crate::nodes::{
    AssetNode, ClientNode, Domain, ImageNode, NodeLabel, ProductNode, ProjectNode,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Loosely typed property bag as returned by the node map projection.
///
/// Every field is optional because one projection serves all four labels.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NodeRecord {
    pub path: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub embedding_vector: Option<Vec<f32>>,
    pub filename: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub file_size: Option<i64>,
    pub format: Option<String>,
    pub visual_hash: Option<String>,
    pub style: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub collection: Option<String>,
    pub postal_code: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

fn missing_key(label: NodeLabel) -> SearchError {
    SearchError::Driver(format!(
        "{label} node without '{}' property",
        label.key_property()
    ))
}

fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    let raw = raw?;
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!(value = %raw, error = %e, "ignoring unparseable project date");
            None
        }
    }
}

impl NodeRecord {
    /// Build the typed node for the first recognised label in `labels`.
    pub fn into_node(self, labels: &[String]) -> Result<AssetNode> {
        let label = labels
            .iter()
            .find_map(|l| l.parse::<NodeLabel>().ok())
            .ok_or_else(|| SearchError::Driver(format!("unrecognised labels {labels:?}")))?;

        // Values outside the known domains are treated as unset.
        let domain = self.domain.as_deref().and_then(|d| d.parse::<Domain>().ok());
        let description = self.description.unwrap_or_default();
        let embedding_vector = self.embedding_vector;

        let node = match label {
            NodeLabel::Client => AssetNode::Client(ClientNode {
                name: self.name.ok_or_else(|| missing_key(label))?,
                description,
                domain,
                embedding_vector,
                address: self.address,
                phone: self.phone,
                collection: self.collection,
                postal_code: self.postal_code,
            }),
            NodeLabel::Product => AssetNode::Product(ProductNode {
                id: self.id.ok_or_else(|| missing_key(label))?,
                name: self.name,
                description,
                domain,
                embedding_vector,
                style: self.style,
            }),
            NodeLabel::Project => AssetNode::Project(ProjectNode {
                name: self.name.ok_or_else(|| missing_key(label))?,
                description,
                domain,
                embedding_vector,
                start_date: parse_date(self.start_date),
                end_date: parse_date(self.end_date),
                status: self.status,
            }),
            NodeLabel::Image => AssetNode::Image(ImageNode {
                path: self.path.ok_or_else(|| missing_key(label))?,
                description,
                domain,
                embedding_vector,
                filename: self.filename,
                width: self.width.and_then(|w| u32::try_from(w).ok()),
                height: self.height.and_then(|h| u32::try_from(h).ok()),
                file_size: self.file_size.and_then(|s| u64::try_from(s).ok()),
                format: self.format,
                visual_hash: self.visual_hash,
                style: self.style,
            }),
        };
        Ok(node)
    }
}

/// Decode a `labels` + `props` row.
pub(crate) fn stored_node(row: &Row) -> Result<StoredNode> {
    let labels: Vec<String> = row.get("labels")?;
    let record: NodeRecord = row.get("props")?;
    let node = record.into_node(&labels)?;
    Ok(StoredNode { node, labels })
}

/// Decode every row, skipping (and logging) the ones that do not convert so
/// one malformed node cannot hide the rest.
pub(crate) fn stored_nodes(rows: &[Row]) -> Vec<StoredNode> {
    rows.iter()
        .filter_map(|row| match stored_node(row) {
            Ok(node) => Some(node),
            Err(e) => {
                warn!(error = %e, "skipping undecodable node row");
                None
            }
        })
        .collect()
}

fn opt<T: Into<BoltType>>(value: Option<T>) -> BoltType {
    value.map_or(BoltType::Null(BoltNull), Into::into)
}

/// Bind the parameters of [`super::queries::upsert`] for `node`.
pub(crate) fn bind_upsert(query: Query, node: &AssetNode) -> Query {
    let embedding: Option<Vec<f64>> = node
        .embedding()
        .map(|v| v.iter().map(|&x| f64::from(x)).collect());

    let query = query
        .param("key", node.key())
        .param("description", node.description())
        .param("domain", opt(node.domain().map(Domain::as_str)))
        .param("embedding_vector", opt(embedding));

    match node {
        AssetNode::Client(c) => query
            .param("address", opt(c.address.clone()))
            .param("phone", opt(c.phone.clone()))
            .param("collection", opt(c.collection.clone()))
            .param("postal_code", opt(c.postal_code.clone())),
        AssetNode::Product(p) => query
            .param("name", opt(p.name.clone()))
            .param("style", opt(p.style.clone())),
        AssetNode::Project(p) => query
            .param(
                "start_date",
                opt(p.start_date.map(|d| d.format(DATE_FORMAT).to_string())),
            )
            .param(
                "end_date",
                opt(p.end_date.map(|d| d.format(DATE_FORMAT).to_string())),
            )
            .param("status", opt(p.status.clone())),
        AssetNode::Image(i) => query
            .param("filename", opt(i.filename.clone()))
            .param("width", opt(i.width.map(i64::from)))
            .param("height", opt(i.height.map(i64::from)))
            .param("file_size", opt(i.file_size.and_then(|s| i64::try_from(s).ok())))
            .param("format", opt(i.format.clone()))
            .param("visual_hash", opt(i.visual_hash.clone()))
            .param("style", opt(i.style.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn image_record_converts_with_metadata() {
        let record = NodeRecord {
            path: Some("/lattice/products/P-1-front.png".into()),
            description: Some("Walnut chair".into()),
            domain: Some("product".into()),
            embedding_vector: Some(vec![0.1, 0.2]),
            width: Some(1024),
            height: Some(-1),
            file_size: Some(2048),
            ..NodeRecord::default()
        };
        let AssetNode::Image(image) = record.into_node(&labels(&["Image"])).unwrap() else {
            panic!("expected an image node");
        };
        assert_eq!(image.domain, Some(Domain::Product));
        assert_eq!(image.width, Some(1024));
        assert_eq!(image.height, None);
        assert_eq!(image.file_size, Some(2048));
        assert_eq!(image.embedding_vector, Some(vec![0.1, 0.2]));
    }

    #[test]
    fn unknown_domain_becomes_unset() {
        let record = NodeRecord {
            path: Some("/x.png".into()),
            domain: Some("furniture".into()),
            ..NodeRecord::default()
        };
        let node = record.into_node(&labels(&["Image"])).unwrap();
        assert_eq!(node.domain(), None);
        assert_eq!(node.description(), "");
    }

    #[test]
    fn first_known_label_wins() {
        let record = NodeRecord {
            id: Some("P-7".into()),
            name: Some("Sofa".into()),
            ..NodeRecord::default()
        };
        let node = record.into_node(&labels(&["Featured", "Product"])).unwrap();
        assert_eq!(node.label(), NodeLabel::Product);
        assert_eq!(node.display_name(), "Sofa");
    }

    #[test]
    fn project_dates_parse_leniently() {
        let record = NodeRecord {
            name: Some("Hilton Lobby".into()),
            start_date: Some("2024-02-01".into()),
            end_date: Some("sometime".into()),
            ..NodeRecord::default()
        };
        let AssetNode::Project(project) = record.into_node(&labels(&["Project"])).unwrap() else {
            panic!("expected a project node");
        };
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(project.end_date, None);
    }

    #[test]
    fn missing_key_is_error() {
        let err = NodeRecord::default()
            .into_node(&labels(&["Client"]))
            .unwrap_err();
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn unknown_label_is_error() {
        assert!(NodeRecord::default().into_node(&labels(&["Ontology"])).is_err());
    }
}

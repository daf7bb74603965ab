//! Node types for the asset graph.
//!
//! Four node types, each identified by a natural key unique within its label:
//! - [`ClientNode`] — customers, keyed by `name`
//! - [`ProductNode`] — catalogue items, keyed by `id`
//! - [`ProjectNode`] — interior design projects, keyed by `name`
//! - [`ImageNode`] — analyzed images, keyed by `path`
//!
//! Rows coming out of the graph store are converted into [`AssetNode`] at the
//! driver boundary; nothing above the driver sees loosely typed property maps.

pub mod client;
pub mod image;
pub mod product;
pub mod project;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SearchError;

pub use client::ClientNode;
pub use image::ImageNode;
pub use product::ProductNode;
pub use project::ProjectNode;

/// Coarse category used to scope a search before falling back to a global scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Client,
    Product,
    Project,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Client, Domain::Product, Domain::Project];

    /// Value stored in the `domain` node property.
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Client => "client",
            Domain::Product => "product",
            Domain::Project => "project",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Domain::Client),
            "product" => Ok(Domain::Product),
            "project" => Ok(Domain::Project),
            other => Err(SearchError::Validation(format!("unknown domain '{other}'"))),
        }
    }
}

/// Graph label of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    Client,
    Product,
    Project,
    Image,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 4] = [
        NodeLabel::Client,
        NodeLabel::Product,
        NodeLabel::Project,
        NodeLabel::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeLabel::Client => "Client",
            NodeLabel::Product => "Product",
            NodeLabel::Project => "Project",
            NodeLabel::Image => "Image",
        }
    }

    /// Property holding the natural key for this label.
    pub fn key_property(self) -> &'static str {
        match self {
            NodeLabel::Client | NodeLabel::Project => "name",
            NodeLabel::Product => "id",
            NodeLabel::Image => "path",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeLabel {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SearchError::Validation(format!("unknown node label '{s}'")))
    }
}

/// Identity of a node: its label plus its natural key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub label: NodeLabel,
    pub key: String,
}

impl NodeKey {
    pub fn new(label: NodeLabel, key: impl Into<String>) -> Self {
        Self {
            label,
            key: key.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label, self.key)
    }
}

/// Any node of the asset graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label")]
pub enum AssetNode {
    Client(ClientNode),
    Product(ProductNode),
    Project(ProjectNode),
    Image(ImageNode),
}

impl AssetNode {
    pub fn label(&self) -> NodeLabel {
        match self {
            AssetNode::Client(_) => NodeLabel::Client,
            AssetNode::Product(_) => NodeLabel::Product,
            AssetNode::Project(_) => NodeLabel::Project,
            AssetNode::Image(_) => NodeLabel::Image,
        }
    }

    /// Natural key value (`name`, `id` or `path` depending on the label).
    pub fn key(&self) -> &str {
        match self {
            AssetNode::Client(n) => &n.name,
            AssetNode::Product(n) => &n.id,
            AssetNode::Project(n) => &n.name,
            AssetNode::Image(n) => &n.path,
        }
    }

    pub fn node_key(&self) -> NodeKey {
        NodeKey::new(self.label(), self.key())
    }

    pub fn description(&self) -> &str {
        match self {
            AssetNode::Client(n) => &n.description,
            AssetNode::Product(n) => &n.description,
            AssetNode::Project(n) => &n.description,
            AssetNode::Image(n) => &n.description,
        }
    }

    pub fn domain(&self) -> Option<Domain> {
        match self {
            AssetNode::Client(n) => n.domain,
            AssetNode::Product(n) => n.domain,
            AssetNode::Project(n) => n.domain,
            AssetNode::Image(n) => n.domain,
        }
    }

    /// Stored embedding, if the node has a non-empty one.
    pub fn embedding(&self) -> Option<&[f32]> {
        let vector = match self {
            AssetNode::Client(n) => &n.embedding_vector,
            AssetNode::Product(n) => &n.embedding_vector,
            AssetNode::Project(n) => &n.embedding_vector,
            AssetNode::Image(n) => &n.embedding_vector,
        };
        vector.as_deref().filter(|v| !v.is_empty())
    }

    pub fn set_embedding(&mut self, embedding: Option<Vec<f32>>) {
        match self {
            AssetNode::Client(n) => n.embedding_vector = embedding,
            AssetNode::Product(n) => n.embedding_vector = embedding,
            AssetNode::Project(n) => n.embedding_vector = embedding,
            AssetNode::Image(n) => n.embedding_vector = embedding,
        }
    }

    /// Human-facing title: the product name when present, else the natural key.
    pub fn display_name(&self) -> &str {
        match self {
            AssetNode::Product(n) => n.name.as_deref().unwrap_or(&n.id),
            other => other.key(),
        }
    }
}

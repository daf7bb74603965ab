//! Manifest files describing nodes and links to load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::edges::Link;
use crate::errors::{Result, SearchError};
use crate::nodes::AssetNode;

/// Nodes and relationships to write, as produced by an upstream crawler.
///
/// ```json
/// {
///   "nodes": [{"label": "Product", "id": "P-1", "description": "Walnut chair"}],
///   "links": [{"kind": "HAS_IMAGE",
///              "from": {"label": "Product", "key": "P-1"},
///              "to": {"label": "Image", "key": "/p/P-1.png"}}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub nodes: Vec<AssetNode>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Manifest {
    /// Read and validate a JSON manifest.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let manifest: Manifest = serde_json::from_str(&raw)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject blank natural keys and link shapes the graph does not allow.
    pub fn validate(&self) -> Result<()> {
        if let Some(node) = self.nodes.iter().find(|n| n.key().trim().is_empty()) {
            return Err(SearchError::Validation(format!(
                "{} node with blank '{}'",
                node.label(),
                node.label().key_property()
            )));
        }
        for link in &self.links {
            link.validate()?;
        }
        Ok(())
    }
}

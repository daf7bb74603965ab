//! Relationship types for the asset graph.
//!
//! Two relationship types exist:
//! - `HAS_IMAGE` — product or project → image
//! - `HAS_PROJECT` — client → project
//!
//! Relationships are directed and created with MERGE semantics: linking the
//! same pair twice leaves a single edge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SearchError};
use crate::nodes::{NodeKey, NodeLabel};

/// Relationship type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    HasImage,
    HasProject,
}

impl RelationKind {
    /// Cypher relationship type name.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::HasImage => "HAS_IMAGE",
            RelationKind::HasProject => "HAS_PROJECT",
        }
    }

    /// Whether `from -[kind]-> to` is a shape the graph allows.
    pub fn allows(self, from: NodeLabel, to: NodeLabel) -> bool {
        match self {
            RelationKind::HasImage => {
                matches!(from, NodeLabel::Product | NodeLabel::Project) && to == NodeLabel::Image
            }
            RelationKind::HasProject => from == NodeLabel::Client && to == NodeLabel::Project,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relationship between two nodes identified by natural key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    pub kind: RelationKind,
    pub from: NodeKey,
    pub to: NodeKey,
}

impl Link {
    /// Build a link, rejecting endpoint labels the relationship does not allow.
    pub fn new(kind: RelationKind, from: NodeKey, to: NodeKey) -> Result<Self> {
        let link = Self { kind, from, to };
        link.validate()?;
        Ok(link)
    }

    pub fn has_image(owner: NodeKey, image_path: impl Into<String>) -> Result<Self> {
        Self::new(
            RelationKind::HasImage,
            owner,
            NodeKey::new(NodeLabel::Image, image_path),
        )
    }

    pub fn has_project(client: impl Into<String>, project: impl Into<String>) -> Result<Self> {
        Self::new(
            RelationKind::HasProject,
            NodeKey::new(NodeLabel::Client, client),
            NodeKey::new(NodeLabel::Project, project),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.kind.allows(self.from.label, self.to.label) {
            Ok(())
        } else {
            Err(SearchError::Validation(format!(
                "{} cannot link {} to {}",
                self.kind, self.from.label, self.to.label
            )))
        }
    }
}

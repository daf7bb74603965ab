//! ProductNode — a catalogue item.

use serde::{Deserialize, Serialize};

use super::Domain;

/// A catalogue product, keyed by `id` (the prefix of its image file name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductNode {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing)]
    pub embedding_vector: Option<Vec<f32>>,
    pub style: Option<String>,
}

impl ProductNode {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: description.into(),
            domain: Some(Domain::Product),
            embedding_vector: None,
            style: None,
        }
    }
}

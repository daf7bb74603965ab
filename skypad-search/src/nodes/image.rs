//! ImageNode — an analyzed image file.

use serde::{Deserialize, Serialize};

use super::Domain;

/// An image, keyed by its file `path`.
///
/// The `domain` of an image is inherited from whatever owns it: product
/// shots carry `product`, project photographs carry `project`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing)]
    pub embedding_vector: Option<Vec<f32>>,
    pub filename: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Size on disk in bytes.
    pub file_size: Option<u64>,
    pub format: Option<String>,
    /// Short perceptual hash of an 8x8 greyscale thumbnail.
    pub visual_hash: Option<String>,
    pub style: Option<String>,
}

impl ImageNode {
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            domain: None,
            embedding_vector: None,
            filename: None,
            width: None,
            height: None,
            file_size: None,
            format: None,
            visual_hash: None,
            style: None,
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }
}

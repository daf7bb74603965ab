//! ClientNode — a customer the studio works for.

use serde::{Deserialize, Serialize};

use super::Domain;

/// A customer, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientNode {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing)]
    pub embedding_vector: Option<Vec<f32>>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Furniture collection associated with the client.
    pub collection: Option<String>,
    pub postal_code: Option<String>,
}

impl ClientNode {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            domain: Some(Domain::Client),
            embedding_vector: None,
            address: None,
            phone: None,
            collection: None,
            postal_code: None,
        }
    }
}

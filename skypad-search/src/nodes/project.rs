//! ProjectNode — an interior design project.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Domain;

/// An interior design project, keyed by `name`.
///
/// Projects reference their photographs through `HAS_IMAGE` edges and are
/// referenced by clients through `HAS_PROJECT` edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectNode {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing)]
    pub embedding_vector: Option<Vec<f32>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

impl ProjectNode {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            domain: Some(Domain::Project),
            embedding_vector: None,
            start_date: None,
            end_date: None,
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_dates_use_iso_format() {
        let mut project = ProjectNode::new("Hilton Lobby", "Interior design project: Hilton Lobby");
        project.start_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["start_date"], json!("2024-03-01"));
        assert_eq!(json["end_date"], serde_json::Value::Null);
    }
}

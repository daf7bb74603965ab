//! Keyword-based domain detection for free-text queries.

use crate::nodes::Domain;

/// Keyword sets in evaluation order. The first domain with a keyword
/// contained in the lower-cased query wins.
const ROUTES: [(Domain, &[&str]); 3] = [
    (Domain::Project, &["project", "hotel", "building", "interior"]),
    (
        Domain::Product,
        &["product", "furniture", "chair", "table", "sofa"],
    ),
    (
        Domain::Client,
        &["client", "customer", "company", "corp", "contact"],
    ),
];

/// Guess which domain `query` is about.
///
/// Matching is substring-based, so `"tables"` routes to product and
/// `"hotels"` to project. Returns `None` when no keyword matches.
pub fn detect_domain(query: &str) -> Option<Domain> {
    let query = query.to_lowercase();
    ROUTES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| query.contains(k)))
        .map(|(domain, _)| *domain)
}

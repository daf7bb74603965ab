//! Cypher text for the Neo4j driver.
//!
//! Labels and relationship types cannot be query parameters, so statements
//! that depend on them are assembled here from the closed enums in
//! [`crate::nodes`] and [`crate::edges`]; user input only ever travels as
//! parameters.

use crate::edges::RelationKind;
use crate::nodes::NodeLabel;

/// Map projection returning every property a [`super::record::NodeRecord`] reads.
const NODE_PROJECTION: &str = "{.path, .name, .id, .description, .domain, .embedding_vector, \
     .filename, .width, .height, .file_size, .format, .visual_hash, .style, \
     .address, .phone, .collection, .postal_code, .start_date, .end_date, .status}";

pub const PING: &str = "RETURN 1 AS ok";

pub const CLEAR: &str = "MATCH (n) DETACH DELETE n";

fn label_pattern(var: &str, label: Option<NodeLabel>) -> String {
    match label {
        Some(label) => format!("({var}:{label})"),
        None => format!("({var})"),
    }
}

fn returning(var: &str) -> String {
    format!("RETURN labels({var}) AS labels, {var} {NODE_PROJECTION} AS props")
}

/// Embedded nodes, optionally scoped; binds `$domain` when `with_domain`.
pub fn fetch_embedded(label: Option<NodeLabel>, with_domain: bool) -> String {
    let domain = if with_domain { " AND n.domain = $domain" } else { "" };
    format!(
        "MATCH {} WHERE n.embedding_vector IS NOT NULL{domain} {}",
        label_pattern("n", label),
        returning("n")
    )
}

/// Substring match on `description`; binds `$needle`, `$limit` and
/// optionally `$domain`.
pub fn text_search(with_domain: bool) -> String {
    let domain = if with_domain { " AND n.domain = $domain" } else { "" };
    format!(
        "MATCH (n) WHERE n.description CONTAINS $needle{domain} {} LIMIT $limit",
        returning("n")
    )
}

/// Server-side cosine similarity against a reference node; binds `$key`,
/// `$min_similarity` and `$limit`.
pub fn similar_to(reference: NodeLabel, candidates: Option<NodeLabel>) -> String {
    format!(
        "MATCH (ref:{reference} {{{key}: $key}}) \
         WHERE ref.embedding_vector IS NOT NULL AND size(ref.embedding_vector) > 0 \
         MATCH {other} \
         WHERE other.embedding_vector IS NOT NULL AND other <> ref \
           AND size(other.embedding_vector) = size(ref.embedding_vector) \
         WITH other, \
              reduce(dot = 0.0, j IN range(0, size(ref.embedding_vector) - 1) | \
                  dot + ref.embedding_vector[j] * other.embedding_vector[j]) AS dot_product, \
              sqrt(reduce(acc = 0.0, a IN ref.embedding_vector | acc + a * a)) AS norm_a, \
              sqrt(reduce(acc = 0.0, b IN other.embedding_vector | acc + b * b)) AS norm_b \
         WITH other, \
              CASE WHEN norm_a = 0 OR norm_b = 0 THEN 0.0 \
                   ELSE dot_product / (norm_a * norm_b) END AS similarity \
         WHERE similarity >= $min_similarity \
         {} , similarity \
         ORDER BY similarity DESC \
         LIMIT $limit",
        returning("other"),
        key = reference.key_property(),
        other = label_pattern("other", candidates),
    )
}

/// Random embedded nodes; binds `$limit`.
pub fn sample(label: Option<NodeLabel>) -> String {
    format!(
        "MATCH {} WHERE n.embedding_vector IS NOT NULL {} ORDER BY rand() LIMIT $limit",
        label_pattern("n", label),
        returning("n")
    )
}

/// Uniqueness constraint on the natural key of `label`.
pub fn key_constraint(label: NodeLabel) -> String {
    let key = label.key_property();
    format!(
        "CREATE CONSTRAINT {lower}_{key} IF NOT EXISTS FOR (n:{label}) REQUIRE n.{key} IS UNIQUE",
        lower = label.as_str().to_lowercase(),
    )
}

/// Range index on `property` of `label`.
pub fn property_index(label: NodeLabel, property: &str) -> String {
    format!(
        "CREATE INDEX {property}_index_{lower} IF NOT EXISTS FOR (n:{label}) ON (n.{property})",
        lower = label.as_str().to_lowercase(),
    )
}

/// MERGE on the natural key and overwrite every typed property. Binds `$key`,
/// `$description`, `$domain`, `$embedding_vector` plus the label's own fields.
pub fn upsert(label: NodeLabel) -> String {
    let specific = match label {
        NodeLabel::Client => {
            "n.address = $address, n.phone = $phone, n.collection = $collection, \
             n.postal_code = $postal_code"
        }
        NodeLabel::Product => "n.name = $name, n.style = $style",
        NodeLabel::Project => {
            "n.start_date = $start_date, n.end_date = $end_date, n.status = $status"
        }
        NodeLabel::Image => {
            "n.filename = $filename, n.width = $width, n.height = $height, \
             n.file_size = $file_size, n.format = $format, n.visual_hash = $visual_hash, \
             n.style = $style"
        }
    };
    format!(
        "MERGE (n:{label} {{{key}: $key}}) \
         ON CREATE SET n.created_at = datetime() \
         SET n.description = $description, n.domain = $domain, \
             n.embedding_vector = $embedding_vector, n.updated_at = datetime(), {specific}",
        key = label.key_property(),
    )
}

/// Idempotent relationship creation; binds `$from` and `$to`, returns
/// `linked` (0 when an endpoint is missing).
pub fn relate(kind: RelationKind, from: NodeLabel, to: NodeLabel) -> String {
    format!(
        "MATCH (a:{from} {{{from_key}: $from}}) \
         MATCH (b:{to} {{{to_key}: $to}}) \
         MERGE (a)-[:{kind}]->(b) \
         RETURN count(*) AS linked",
        from_key = from.key_property(),
        to_key = to.key_property(),
    )
}

/// Client → project links by name word or collection; returns `created`.
pub const LINK_PROJECTS_TO_CLIENTS: &str = "\
    MATCH (p:Project), (c:Client) \
    WHERE ((trim(c.name) <> '' AND toLower(p.name) CONTAINS toLower(split(trim(c.name), ' ')[0])) \
        OR (c.collection IS NOT NULL AND trim(c.collection) <> '' \
            AND toLower(p.name) CONTAINS toLower(trim(c.collection)))) \
      AND NOT EXISTS { (c)-[:HAS_PROJECT]->(p) } \
    MERGE (c)-[:HAS_PROJECT]->(p) \
    RETURN count(*) AS created";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_embedded_adds_filters_only_when_requested() {
        let unscoped = fetch_embedded(None, false);
        assert!(unscoped.starts_with("MATCH (n) WHERE n.embedding_vector IS NOT NULL RETURN"));
        assert!(!unscoped.contains("$domain"));

        let scoped = fetch_embedded(Some(NodeLabel::Image), true);
        assert!(scoped.starts_with("MATCH (n:Image)"));
        assert!(scoped.contains("AND n.domain = $domain"));
    }

    #[test]
    fn similar_to_keys_reference_by_label() {
        let q = similar_to(NodeLabel::Product, Some(NodeLabel::Image));
        assert!(q.contains("MATCH (ref:Product {id: $key})"));
        assert!(q.contains("MATCH (other:Image)"));
        assert!(q.contains("similarity >= $min_similarity"));
        assert!(q.contains("AS props , similarity"));
    }

    #[test]
    fn upsert_merges_on_natural_key() {
        assert!(upsert(NodeLabel::Image).starts_with("MERGE (n:Image {path: $key})"));
        assert!(upsert(NodeLabel::Client).contains("n.collection = $collection"));
        assert!(!upsert(NodeLabel::Product).contains("$collection"));
    }

    #[test]
    fn relate_uses_merge() {
        let q = relate(RelationKind::HasImage, NodeLabel::Project, NodeLabel::Image);
        assert!(q.contains("MATCH (a:Project {name: $from})"));
        assert!(q.contains("MATCH (b:Image {path: $to})"));
        assert!(q.contains("MERGE (a)-[:HAS_IMAGE]->(b)"));
    }

    #[test]
    fn schema_statements() {
        assert_eq!(
            key_constraint(NodeLabel::Product),
            "CREATE CONSTRAINT product_id IF NOT EXISTS FOR (n:Product) REQUIRE n.id IS UNIQUE"
        );
        assert_eq!(
            property_index(NodeLabel::Image, "domain"),
            "CREATE INDEX domain_index_image IF NOT EXISTS FOR (n:Image) ON (n.domain)"
        );
    }
}

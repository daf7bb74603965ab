//! Shared utilities.
//!
//! - Cosine similarity over embedding vectors
//! - Whitespace normalization and display truncation
//! - Cache key generation (MD5 of model + text for the embedding cache)

pub mod similarity;
pub mod text;

pub use similarity::{cosine_similarity, same_dimensions};
pub use text::{first_word_lower, normalize_whitespace, truncate_with_ellipsis};

/// Hex MD5 digest of `parts`, fed in order.
///
/// Used as a compact, fixed-size key for cached embeddings.
pub fn cache_key(parts: &[&str]) -> String {
    use md5::{Digest, Md5};
    let mut h = Md5::new();
    for part in parts {
        h.update(part.as_bytes());
        // Separator keeps ("ab", "c") and ("a", "bc") distinct.
        h.update([0u8]);
    }
    format!("{:x}", h.finalize())
}

#[cfg(test)]
mod tests {
    use super::cache_key;

    #[test]
    fn cache_key_is_stable_hex() {
        let key = cache_key(&["text-embedding-3-small", "oak table"]);
        assert_eq!(key.len(), 32);
        assert_eq!(key, cache_key(&["text-embedding-3-small", "oak table"]));
    }

    #[test]
    fn cache_key_separates_parts() {
        assert_ne!(cache_key(&["ab", "c"]), cache_key(&["a", "bc"]));
    }
}

//! Text helpers shared by query handling, node linking and result display.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("static regex is valid"))
}

/// Collapse runs of whitespace into single spaces and trim both ends.
///
/// Queries are normalized this way before being embedded, so `"oak  table"`
/// and `"oak table\n"` share a cache entry.
pub fn normalize_whitespace(s: &str) -> String {
    whitespace_re().replace_all(s, " ").trim().to_string()
}

/// Shorten `s` to at most `max_chars` characters, ending in `"..."` when cut.
///
/// Counts characters rather than bytes, so multi-byte descriptions never get
/// split inside a code point.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }

    let cut = s
        .char_indices()
        .nth(max_chars - 3)
        .map_or(s.len(), |(i, _)| i);
    format!("{}...", &s[..cut])
}

/// Lower-cased first whitespace-separated word of `s`, if any.
///
/// Client names such as `"Hilton Worldwide"` are matched against project
/// names by this leading word.
pub fn first_word_lower(s: &str) -> Option<String> {
    s.split_whitespace().next().map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_mixed_whitespace() {
        assert_eq!(normalize_whitespace("oak   table"), "oak table");
        assert_eq!(normalize_whitespace("oak\t\ttable\n"), "oak table");
        assert_eq!(normalize_whitespace("  lobby  "), "lobby");
    }

    #[test]
    fn normalize_blank_input_is_empty() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \t\n "), "");
    }

    #[test]
    fn normalize_handles_unicode_spaces() {
        assert_eq!(normalize_whitespace("velvet\u{00A0}sofa"), "velvet sofa");
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_with_ellipsis("sofa", 10), "sofa");
        assert_eq!(truncate_with_ellipsis("sofa", 4), "sofa");
        assert_eq!(truncate_with_ellipsis("", 3), "");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_with_ellipsis("walnut dining table", 9), "walnut...");
    }

    #[test]
    fn truncate_tiny_budgets_are_all_dots() {
        assert_eq!(truncate_with_ellipsis("walnut", 0), "");
        assert_eq!(truncate_with_ellipsis("walnut", 2), "..");
        assert_eq!(truncate_with_ellipsis("walnut", 3), "...");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_with_ellipsis("ソファとテーブル", 5), "ソフ...");
    }

    #[test]
    fn first_word_is_lowercased() {
        assert_eq!(first_word_lower("Hilton Worldwide").as_deref(), Some("hilton"));
        assert_eq!(first_word_lower("   "), None);
    }
}

//! Search subsystem.
//!
//! - [`router`] guesses a query's domain from keywords
//! - [`rank`] scores embedded candidates with cosine similarity
//! - [`engine::SearchEngine`] orchestrates domain-scoped, smart, image and
//!   reference ("more like this") searches with text fallback

pub mod engine;
pub mod rank;
pub mod results;
pub mod router;

pub use engine::SearchEngine;
pub use rank::{rank, Cutoff};
pub use results::{
    group_by_domain, MatchKind, ScoredResult, SearchStrategy, SmartSearchResults, UNKNOWN_DOMAIN,
};
pub use router::detect_domain;

//! Catalog search ranking
//!
//! Weighted multi-field matching over an in-memory catalog, with a cheap
//! character-overlap bonus that tolerates minor misspellings in product names.

mod ranking;
mod similarity;

pub use ranking::{query_terms, rank, rank_top, score_item, SearchResult};
pub use similarity::similarity;

/// Points for each kind of field match, per query term.
pub const NAME_EXACT: u32 = 100;
pub const NAME_PREFIX: u32 = 50;
pub const NAME_CONTAINS: u32 = 25;
pub const DESCRIPTION_CONTAINS: u32 = 10;
pub const CATEGORY_EXACT: u32 = 30;
pub const CATEGORY_CONTAINS: u32 = 15;
pub const TAGS_CONTAIN: u32 = 20;

/// Similarity above which a name word earns the fuzzy bonus.
pub const FUZZY_THRESHOLD: f64 = 0.7;

/// Fuzzy bonus is `floor(similarity * FUZZY_WEIGHT)`.
pub const FUZZY_WEIGHT: f64 = 30.0;

/// Words and terms must be longer than this to be compared fuzzily.
pub const FUZZY_MIN_LEN: usize = 2;

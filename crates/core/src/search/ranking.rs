//! Relevance scoring for catalog search

use serde::{Deserialize, Serialize};

use super::similarity::similarity;
use super::{
    CATEGORY_CONTAINS, CATEGORY_EXACT, DESCRIPTION_CONTAINS, FUZZY_MIN_LEN, FUZZY_THRESHOLD,
    FUZZY_WEIGHT, NAME_CONTAINS, NAME_EXACT, NAME_PREFIX, TAGS_CONTAIN,
};
use crate::domain::product::{CatalogItem, ProductId};

/// A matched catalog item and its relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub product_id: ProductId,
    pub score: u32,
    pub item: CatalogItem,
}

/// Lower-cased, whitespace-split query terms with empties dropped.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).filter(|term| !term.is_empty()).collect()
}

/// Rank `catalog` against `query`.
///
/// Items scoring zero are dropped. The rest are ordered by score descending;
/// equal scores keep their catalog order.
pub fn rank(catalog: &[CatalogItem], query: &str) -> Vec<SearchResult> {
    let terms = query_terms(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = catalog
        .iter()
        .filter_map(|item| {
            let score = score_item(item, &terms);
            (score > 0).then(|| SearchResult {
                product_id: item.id.clone(),
                score,
                item: item.clone(),
            })
        })
        .collect();

    // sort_by is stable, which keeps catalog order on ties
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}

/// [`rank`], truncated to the best `limit` results.
pub fn rank_top(catalog: &[CatalogItem], query: &str, limit: usize) -> Vec<SearchResult> {
    let mut results = rank(catalog, query);
    results.truncate(limit);
    results
}

/// Total score of one item over already-normalized terms.
pub fn score_item(item: &CatalogItem, terms: &[String]) -> u32 {
    let name = item.name.to_lowercase();
    let description = item.description.as_deref().map(str::to_lowercase);
    let category = item.category.to_lowercase();
    let tags = item.tags.join(" ").to_lowercase();

    terms
        .iter()
        .map(|term| {
            let term = term.as_str();
            let mut score: u32 = 0;

            if name == term {
                score = score.saturating_add(NAME_EXACT);
            } else if name.starts_with(term) {
                score = score.saturating_add(NAME_PREFIX);
            } else if name.contains(term) {
                score = score.saturating_add(NAME_CONTAINS);
            }

            if description.as_deref().is_some_and(|description| description.contains(term)) {
                score = score.saturating_add(DESCRIPTION_CONTAINS);
            }

            if category == term {
                score = score.saturating_add(CATEGORY_EXACT);
            } else if category.contains(term) {
                score = score.saturating_add(CATEGORY_CONTAINS);
            }

            if tags.contains(term) {
                score = score.saturating_add(TAGS_CONTAIN);
            }

            score.saturating_add(fuzzy_name_bonus(&name, term))
        })
        .fold(0, u32::saturating_add)
}

fn fuzzy_name_bonus(name: &str, term: &str) -> u32 {
    if term.chars().count() <= FUZZY_MIN_LEN {
        return 0;
    }

    name.split_whitespace()
        .filter(|word| word.chars().count() > FUZZY_MIN_LEN)
        .map(|word| similarity(word, term))
        .filter(|ratio| *ratio > FUZZY_THRESHOLD)
        .map(|ratio| (ratio * FUZZY_WEIGHT).floor() as u32)
        .fold(0, u32::saturating_add)
}

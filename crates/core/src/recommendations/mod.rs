//! Rule-based recommendation fallback
//!
//! Used when the AI ranking service is unavailable. Candidates are scored from
//! the shopper's browsing context: category visits, past purchase categories,
//! and current discount, plus a small random jitter so repeated calls do not
//! always surface the same list.

mod jitter;

pub use jitter::{JitterSource, NoJitter, RandomJitter, MAX_JITTER};

use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::domain::context::UserBrowsingContext;
use crate::domain::product::CatalogItem;

/// Points per recorded visit to the item's category.
pub const CATEGORY_VISIT_WEIGHT: f64 = 10.0;

/// Flat boost when the shopper has bought from the item's category before.
pub const PURCHASED_CATEGORY_BOOST: f64 = 50.0;

/// Points per discount percentage point.
pub const DISCOUNT_WEIGHT: f64 = 0.5;

/// Recommendations returned when the caller does not ask for a count.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 8;

/// Score one candidate, jitter excluded.
pub fn base_score(item: &CatalogItem, context: &UserBrowsingContext) -> f64 {
    let visits = f64::from(context.visits_for(&item.category)) * CATEGORY_VISIT_WEIGHT;
    let purchased =
        if context.has_purchased_in(&item.category) { PURCHASED_CATEGORY_BOOST } else { 0.0 };
    let discount = item
        .discount
        .and_then(|discount| discount.to_f64())
        .map(|discount| discount * DISCOUNT_WEIGHT)
        .unwrap_or(0.0);

    visits + purchased + discount
}

/// Top `limit` catalog items for `context`, skipping anything recently viewed.
pub fn recommend<J: JitterSource + ?Sized>(
    catalog: &[CatalogItem],
    context: &UserBrowsingContext,
    limit: usize,
    jitter: &mut J,
) -> Vec<CatalogItem> {
    let mut scored: Vec<(f64, &CatalogItem)> = catalog
        .iter()
        .filter(|item| !context.has_recently_viewed(&item.id))
        .map(|item| (base_score(item, context) + jitter.next_jitter(), item))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    debug!(
        event_name = "storefront.recommendations.scored",
        candidates = scored.len(),
        limit,
        "fallback recommendations scored"
    );

    scored.into_iter().take(limit).map(|(_, item)| item.clone()).collect()
}

/// Recommendation fallback with a configured default limit.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    default_limit: usize,
}

impl RecommendationEngine {
    pub fn new(default_limit: usize) -> Self {
        Self { default_limit }
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    pub fn recommend<J: JitterSource + ?Sized>(
        &self,
        catalog: &[CatalogItem],
        context: &UserBrowsingContext,
        limit: Option<usize>,
        jitter: &mut J,
    ) -> Vec<CatalogItem> {
        recommend(catalog, context, limit.unwrap_or(self.default_limit), jitter)
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RECOMMENDATION_LIMIT)
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

pub const MAX_RECENTLY_VIEWED: usize = 20;
pub const MAX_RECENT_SEARCHES: usize = 10;

/// Per-session browsing state used by the recommendation fallback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBrowsingContext {
    #[serde(default)]
    pub category_visits: HashMap<String, u32>,
    #[serde(default)]
    pub purchased_categories: Vec<String>,
    #[serde(default)]
    pub recently_viewed: Vec<ProductId>,
    #[serde(default)]
    pub recent_searches: Vec<String>,
}

impl UserBrowsingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits_for(&self, category: &str) -> u32 {
        self.category_visits.get(category).copied().unwrap_or(0)
    }

    pub fn has_purchased_in(&self, category: &str) -> bool {
        self.purchased_categories.iter().any(|purchased| purchased == category)
    }

    pub fn has_recently_viewed(&self, id: &ProductId) -> bool {
        self.recently_viewed.contains(id)
    }

    pub fn record_category_visit(&mut self, category: impl Into<String>) {
        let count = self.category_visits.entry(category.into()).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Most recent first, de-duplicated.
    pub fn record_view(&mut self, id: ProductId) {
        self.recently_viewed.retain(|viewed| *viewed != id);
        self.recently_viewed.insert(0, id);
        self.recently_viewed.truncate(MAX_RECENTLY_VIEWED);
    }

    pub fn record_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.recent_searches.retain(|previous| previous != query);
        self.recent_searches.insert(0, query.to_string());
        self.recent_searches.truncate(MAX_RECENT_SEARCHES);
    }

    pub fn record_purchase(&mut self, category: impl Into<String>) {
        let category = category.into();
        if !self.has_purchased_in(&category) {
            self.purchased_categories.push(category);
        }
    }
}

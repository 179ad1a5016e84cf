//! Composition root for the scoring engines.
//!
//! Owns the catalog cache and routes search and recommendation calls through
//! a single cached catalog read.

use std::sync::Arc;

use tracing::info;

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::StorefrontConfig;
use crate::domain::context::UserBrowsingContext;
use crate::domain::order::OrderSummary;
use crate::domain::product::CatalogItem;
use crate::errors::ApplicationError;
use crate::fraud::{FraudCheckInput, FraudCheckResult, FraudScorer};
use crate::loyalty::{compute_loyalty_from_orders, LoyaltySnapshot};
use crate::recommendations::{JitterSource, RecommendationEngine};
use crate::search::{rank_top, SearchResult};

const CATALOG_CACHE_KEY: &str = "catalog:all";

/// Where the product catalog comes from: the hosted product table in
/// production, a JSON file in the CLI, a fixture in tests.
pub trait CatalogSource {
    fn load_catalog(&self) -> Result<Vec<CatalogItem>, ApplicationError>;
}

/// A catalog that is already in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
}

impl StaticCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

impl CatalogSource for StaticCatalog {
    fn load_catalog(&self) -> Result<Vec<CatalogItem>, ApplicationError> {
        Ok(self.items.clone())
    }
}

pub struct Storefront<S, C = SystemClock> {
    source: S,
    catalog_cache: TtlCache<Arc<[CatalogItem]>, C>,
    recommendations: RecommendationEngine,
    fraud: FraudScorer,
    max_search_results: usize,
    correlation_id: String,
}

impl<S: CatalogSource> Storefront<S, SystemClock> {
    pub fn new(source: S, config: &StorefrontConfig) -> Self {
        Self::with_clock(source, config, SystemClock)
    }
}

impl<S: CatalogSource, C: Clock> Storefront<S, C> {
    pub fn with_clock(source: S, config: &StorefrontConfig, clock: C) -> Self {
        Self {
            source,
            catalog_cache: TtlCache::with_clock(config.cache_ttl(), clock),
            recommendations: RecommendationEngine::new(config.recommendations.default_limit),
            fraud: config.fraud_scorer(),
            max_search_results: config.search.max_results,
            correlation_id: "unassigned".to_string(),
        }
    }

    /// Tag emitted with every log event from this instance.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    /// Catalog from cache, loading it from the source on a miss or after expiry.
    pub fn catalog(&mut self) -> Result<Arc<[CatalogItem]>, ApplicationError> {
        let source = &self.source;
        let correlation_id = self.correlation_id.as_str();
        self.catalog_cache.get_or_insert_with(CATALOG_CACHE_KEY, || {
            let items = source.load_catalog()?;
            info!(
                event_name = "storefront.catalog.loaded",
                correlation_id,
                item_count = items.len(),
                "catalog loaded from source"
            );
            Ok(Arc::from(items))
        })
    }

    /// Drop the cached catalog so the next read hits the source.
    pub fn refresh_catalog(&mut self) {
        self.catalog_cache.invalidate(Some(CATALOG_CACHE_KEY));
    }

    pub fn search(
        &mut self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>, ApplicationError> {
        let catalog = self.catalog()?;
        let limit = limit.unwrap_or(self.max_search_results).min(self.max_search_results);
        let results = rank_top(&catalog, query, limit);

        info!(
            event_name = "storefront.search.ranked",
            correlation_id = self.correlation_id.as_str(),
            result_count = results.len(),
            "search ranked"
        );
        Ok(results)
    }

    pub fn recommend<J: JitterSource + ?Sized>(
        &mut self,
        context: &UserBrowsingContext,
        limit: Option<usize>,
        jitter: &mut J,
    ) -> Result<Vec<CatalogItem>, ApplicationError> {
        let catalog = self.catalog()?;
        let picks = self.recommendations.recommend(&catalog, context, limit, jitter);

        info!(
            event_name = "storefront.recommendations.served",
            correlation_id = self.correlation_id.as_str(),
            result_count = picks.len(),
            "fallback recommendations served"
        );
        Ok(picks)
    }

    pub fn loyalty(&self, orders: &[OrderSummary]) -> LoyaltySnapshot {
        compute_loyalty_from_orders(orders)
    }

    pub fn check_fraud(&self, input: &FraudCheckInput) -> FraudCheckResult {
        self.fraud.check(input)
    }
}

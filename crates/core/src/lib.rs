pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fraud;
pub mod loyalty;
pub mod recommendations;
pub mod search;
pub mod storefront;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use config::{LoadOptions, StorefrontConfig};
pub use domain::context::UserBrowsingContext;
pub use domain::order::{OrderSummary, PaymentStatus};
pub use domain::product::{CatalogItem, ProductId};
pub use errors::ApplicationError;
pub use fraud::{
    check_fraud, FraudCheckInput, FraudCheckResult, FraudScorer, FraudSignal, FraudSignalKind,
    FraudThresholds,
};
pub use loyalty::{compute_loyalty, LoyaltySnapshot, LoyaltyTier};
pub use recommendations::{recommend, JitterSource, NoJitter, RandomJitter, RecommendationEngine};
pub use search::{rank, similarity, SearchResult};
pub use storefront::{CatalogSource, StaticCatalog, Storefront};

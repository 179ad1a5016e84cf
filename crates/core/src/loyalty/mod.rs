//! Loyalty tiers derived from cumulative paid spend.
//!
//! One currency unit of paid spend earns one point; points never include a
//! fractional part.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    /// Lower-case name as it appears in serialized snapshots.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    /// Minimum points needed to hold this tier.
    pub fn threshold(&self) -> u64 {
        self.definition().threshold
    }

    /// Whole-percent discount granted at this tier.
    pub fn discount_percent(&self) -> u8 {
        self.definition().discount_percent
    }

    /// Tier directly above, or `None` at the top.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }

    /// Highest tier whose threshold is at or below `points`.
    pub fn for_points(points: u64) -> Self {
        TIERS
            .iter()
            .rev()
            .find(|definition| definition.threshold <= points)
            .map(|definition| definition.tier)
            .unwrap_or(Self::Bronze)
    }

    fn definition(&self) -> &'static TierDefinition {
        match self {
            Self::Bronze => &TIERS[0],
            Self::Silver => &TIERS[1],
            Self::Gold => &TIERS[2],
            Self::Platinum => &TIERS[3],
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct TierDefinition {
    tier: LoyaltyTier,
    threshold: u64,
    discount_percent: u8,
}

/// Ascending by threshold.
const TIERS: [TierDefinition; 4] = [
    TierDefinition { tier: LoyaltyTier::Bronze, threshold: 0, discount_percent: 0 },
    TierDefinition { tier: LoyaltyTier::Silver, threshold: 500, discount_percent: 5 },
    TierDefinition { tier: LoyaltyTier::Gold, threshold: 2_000, discount_percent: 10 },
    TierDefinition { tier: LoyaltyTier::Platinum, threshold: 5_000, discount_percent: 15 },
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltySnapshot {
    pub points: u64,
    pub tier: LoyaltyTier,
    pub discount_percent: u8,
    pub next_tier: Option<LoyaltyTier>,
    pub next_tier_threshold: Option<u64>,
    pub points_to_next_tier: u64,
}

/// Floor of spend; negative spend earns nothing.
pub fn points_for_spend(total_paid_spend: Decimal) -> u64 {
    if total_paid_spend <= Decimal::ZERO {
        return 0;
    }
    total_paid_spend.floor().to_u64().unwrap_or(u64::MAX)
}

/// Snapshot for a pre-aggregated paid spend. Unpaid and cancelled orders must
/// already be excluded; see [`total_paid_spend`].
pub fn compute_loyalty(total_paid_spend: Decimal) -> LoyaltySnapshot {
    let points = points_for_spend(total_paid_spend);
    let tier = LoyaltyTier::for_points(points);
    let next_tier = tier.next();
    let next_tier_threshold = next_tier.map(|next| next.threshold());

    LoyaltySnapshot {
        points,
        tier,
        discount_percent: tier.discount_percent(),
        next_tier,
        next_tier_threshold,
        points_to_next_tier: next_tier_threshold
            .map(|threshold| threshold.saturating_sub(points))
            .unwrap_or(0),
    }
}

/// Sum of order totals with a `paid` status, saturating at `Decimal::MAX`.
pub fn total_paid_spend(orders: &[OrderSummary]) -> Decimal {
    orders
        .iter()
        .filter(|order| order.is_paid())
        .fold(Decimal::ZERO, |total, order| {
            total.checked_add(order.total).unwrap_or(Decimal::MAX)
        })
}

pub fn compute_loyalty_from_orders(orders: &[OrderSummary]) -> LoyaltySnapshot {
    compute_loyalty(total_paid_spend(orders))
}

//! Checkout fraud-risk scoring.
//!
//! Each rule inspects pre-fetched order and account aggregates and may emit a
//! signal. Signals are additive; the aggregate score decides whether checkout
//! is flagged for review or blocked outright.

mod fingerprint;

pub use fingerprint::{device_fingerprint, DeviceAttributes};

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::order::OrderSummary;

pub const VELOCITY_ORDER_COUNT: u32 = 3;
pub const VELOCITY_SCORE: u32 = 30;
pub const NEW_ACCOUNT_MAX_AGE_DAYS: f64 = 1.0;
pub const NEW_ACCOUNT_AMOUNT_GATE: i64 = 500;
pub const NEW_ACCOUNT_AMOUNT_FLOOR: i64 = 200;
pub const NEW_ACCOUNT_AMOUNT_SCORE: u32 = 25;
pub const DISPOSABLE_EMAIL_SCORE: u32 = 40;
pub const LARGE_ORDER_AMOUNT: i64 = 1_000;
pub const LARGE_ORDER_SCORE: u32 = 15;

/// Built-in disposable mailbox providers.
pub const DISPOSABLE_EMAIL_DOMAINS: &[&str] = &[
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "tempmail.com",
    "throwaway.email",
    "yopmail.com",
    "trashmail.com",
    "sharklasers.com",
    "getnada.com",
    "dispostable.com",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudSignalKind {
    Velocity,
    Device,
    Address,
    Email,
    Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudSignal {
    pub kind: FraudSignalKind,
    pub score: u32,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudCheckResult {
    pub risk_score: u32,
    pub is_risky: bool,
    pub should_block: bool,
    pub signals: Vec<FraudSignal>,
}

/// Aggregates the caller fetched for one checkout attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FraudCheckInput {
    #[serde(default)]
    pub user_id: Option<String>,
    pub email: String,
    pub order_total: Decimal,
    #[serde(default)]
    pub recent_order_count_last_hour: u32,
    #[serde(default)]
    pub account_age_days: Option<f64>,
}

impl FraudCheckInput {
    pub fn new(email: impl Into<String>, order_total: Decimal) -> Self {
        Self {
            user_id: None,
            email: email.into(),
            order_total,
            recent_order_count_last_hour: 0,
            account_age_days: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_recent_orders(mut self, count: u32) -> Self {
        self.recent_order_count_last_hour = count;
        self
    }

    pub fn with_account_age_days(mut self, days: f64) -> Self {
        self.account_age_days = Some(days);
        self
    }
}

/// Score thresholds. `block_at` must not be below `risky_above`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudThresholds {
    /// Scores strictly above this are risky.
    pub risky_above: u32,
    /// Scores at or above this are blocked.
    pub block_at: u32,
}

impl Default for FraudThresholds {
    fn default() -> Self {
        Self { risky_above: 30, block_at: 70 }
    }
}

#[derive(Clone, Debug)]
pub struct FraudScorer {
    thresholds: FraudThresholds,
    disposable_domains: BTreeSet<String>,
}

impl Default for FraudScorer {
    fn default() -> Self {
        Self::new(FraudThresholds::default())
    }
}

impl FraudScorer {
    pub fn new(thresholds: FraudThresholds) -> Self {
        Self {
            thresholds,
            disposable_domains: DISPOSABLE_EMAIL_DOMAINS
                .iter()
                .map(|domain| domain.to_string())
                .collect(),
        }
    }

    /// Add domains on top of the built-in denylist.
    pub fn with_extra_domains<I, T>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.disposable_domains.extend(
            domains
                .into_iter()
                .map(|domain| domain.as_ref().trim().to_ascii_lowercase())
                .filter(|domain| !domain.is_empty()),
        );
        self
    }

    pub fn thresholds(&self) -> FraudThresholds {
        self.thresholds
    }

    pub fn is_disposable(&self, email: &str) -> bool {
        email_domain(email).is_some_and(|domain| self.disposable_domains.contains(&domain))
    }

    pub fn check(&self, input: &FraudCheckInput) -> FraudCheckResult {
        let mut signals = Vec::new();

        if input.recent_order_count_last_hour >= VELOCITY_ORDER_COUNT {
            signals.push(FraudSignal {
                kind: FraudSignalKind::Velocity,
                score: VELOCITY_SCORE,
                reason: format!(
                    "{} orders placed in the last hour",
                    input.recent_order_count_last_hour
                ),
            });
        }

        // The 200 floor is redundant once the 500 gate holds.
        let new_account = input.account_age_days.is_some_and(|age| age < NEW_ACCOUNT_MAX_AGE_DAYS);
        if input.user_id.is_some()
            && input.order_total > Decimal::from(NEW_ACCOUNT_AMOUNT_GATE)
            && new_account
            && input.order_total > Decimal::from(NEW_ACCOUNT_AMOUNT_FLOOR)
        {
            signals.push(FraudSignal {
                kind: FraudSignalKind::Amount,
                score: NEW_ACCOUNT_AMOUNT_SCORE,
                reason: format!(
                    "order of {} from an account less than a day old",
                    input.order_total
                ),
            });
        }

        if self.is_disposable(&input.email) {
            signals.push(FraudSignal {
                kind: FraudSignalKind::Email,
                score: DISPOSABLE_EMAIL_SCORE,
                reason: format!(
                    "disposable email domain `{}`",
                    email_domain(&input.email).unwrap_or_default()
                ),
            });
        }

        if input.order_total > Decimal::from(LARGE_ORDER_AMOUNT) {
            signals.push(FraudSignal {
                kind: FraudSignalKind::Amount,
                score: LARGE_ORDER_SCORE,
                reason: format!("order total {} exceeds {}", input.order_total, LARGE_ORDER_AMOUNT),
            });
        }

        let result = self.evaluate(signals);
        if result.should_block {
            warn!(
                event_name = "storefront.fraud.blocked",
                risk_score = result.risk_score,
                signal_count = result.signals.len(),
                "checkout blocked by fraud score"
            );
        } else {
            debug!(
                event_name = "storefront.fraud.checked",
                risk_score = result.risk_score,
                is_risky = result.is_risky,
                "fraud check completed"
            );
        }
        result
    }

    /// Aggregate arbitrary signals, including device or address signals
    /// produced outside the built-in rules.
    pub fn evaluate(&self, signals: Vec<FraudSignal>) -> FraudCheckResult {
        let risk_score =
            signals.iter().map(|signal| signal.score).fold(0u32, u32::saturating_add);
        FraudCheckResult {
            risk_score,
            is_risky: risk_score > self.thresholds.risky_above,
            should_block: risk_score >= self.thresholds.block_at,
            signals,
        }
    }
}

/// Score with the default thresholds and denylist.
pub fn check_fraud(input: &FraudCheckInput) -> FraudCheckResult {
    FraudScorer::default().check(input)
}

/// Lower-cased text after the last `@`, if any.
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    let domain = domain.trim().to_ascii_lowercase();
    (!domain.is_empty()).then_some(domain)
}

/// Orders created within the hour before `now`.
pub fn count_recent_orders(orders: &[OrderSummary], now: DateTime<Utc>) -> u32 {
    let window_start = now - Duration::hours(1);
    let count = orders
        .iter()
        .filter(|order| order.created_at >= window_start && order.created_at <= now)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Fractional account age in days, clamped at zero.
pub fn account_age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - created_at).num_seconds().max(0);
    seconds as f64 / 86_400.0
}

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use rust_decimal::Decimal;
use storefront_core::errors::ApplicationError;
use storefront_core::fraud::{account_age_days, count_recent_orders};
use storefront_core::{FraudCheckInput, OrderSummary};
use tracing::info;

use crate::commands::{read_json, CommandResult, RunContext};

const COMMAND: &str = "fraud";

#[derive(Debug, Clone, Args)]
pub struct FraudArgs {
    #[arg(long, help = "Customer email address")]
    pub email: String,
    #[arg(long, help = "Order total in currency units")]
    pub total: Decimal,
    #[arg(long, help = "Authenticated user id, if any")]
    pub user_id: Option<String>,
    #[arg(
        long,
        default_value_t = 0,
        conflicts_with = "orders",
        help = "Orders placed in the last hour"
    )]
    pub recent_orders: u32,
    #[arg(long, help = "Path to a JSON array of the user's orders; counts the last hour")]
    pub orders: Option<PathBuf>,
    #[arg(long, conflicts_with = "account_created_at", help = "Account age in days")]
    pub account_age_days: Option<f64>,
    #[arg(long, help = "Account creation timestamp (RFC 3339)")]
    pub account_created_at: Option<DateTime<Utc>>,
}

pub fn run(args: &FraudArgs, context: &RunContext) -> CommandResult {
    match build_input(args, Utc::now()) {
        Ok(input) => {
            let result = context.config.fraud_scorer().check(&input);
            info!(
                event_name = "storefront.fraud.checked",
                correlation_id = context.correlation_id.as_str(),
                risk_score = result.risk_score,
                should_block = result.should_block,
                "fraud check completed"
            );
            let message = if result.should_block {
                format!("order blocked (risk score {})", result.risk_score)
            } else if result.is_risky {
                format!("order flagged for review (risk score {})", result.risk_score)
            } else {
                format!("order accepted (risk score {})", result.risk_score)
            };
            CommandResult::success_with_data(COMMAND, message, result)
        }
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn build_input(args: &FraudArgs, now: DateTime<Utc>) -> Result<FraudCheckInput, ApplicationError> {
    if args.total.is_sign_negative() {
        return Err(ApplicationError::InvalidInput("--total must not be negative".to_string()));
    }

    let recent_orders = match &args.orders {
        Some(path) => count_recent_orders(&read_json::<Vec<OrderSummary>>(path)?, now),
        None => args.recent_orders,
    };

    let mut input =
        FraudCheckInput::new(args.email.clone(), args.total).with_recent_orders(recent_orders);
    if let Some(user_id) = &args.user_id {
        input = input.with_user(user_id.clone());
    }

    let age = args
        .account_age_days
        .or_else(|| args.account_created_at.map(|created_at| account_age_days(created_at, now)));
    if let Some(days) = age {
        if !days.is_finite() || days < 0.0 {
            return Err(ApplicationError::InvalidInput(format!(
                "account age must be a non-negative number of days, got {days}"
            )));
        }
        input = input.with_account_age_days(days);
    }

    Ok(input)
}

use std::path::PathBuf;

use clap::Args;
use rust_decimal::Decimal;
use storefront_core::errors::ApplicationError;
use storefront_core::loyalty::compute_loyalty_from_orders;
use storefront_core::{compute_loyalty, OrderSummary};

use crate::commands::{read_json, CommandResult};

const COMMAND: &str = "loyalty";

#[derive(Debug, Clone, Args)]
pub struct LoyaltyArgs {
    #[arg(
        long,
        conflicts_with = "orders",
        required_unless_present = "orders",
        help = "Total paid spend in currency units"
    )]
    pub spend: Option<Decimal>,
    #[arg(long, help = "Path to a JSON array of orders; only paid orders count")]
    pub orders: Option<PathBuf>,
}

pub fn run(args: &LoyaltyArgs) -> CommandResult {
    let snapshot = match (args.spend, &args.orders) {
        (Some(spend), None) => compute_loyalty(spend),
        (None, Some(path)) => match read_json::<Vec<OrderSummary>>(path) {
            Ok(orders) => compute_loyalty_from_orders(&orders),
            Err(error) => return CommandResult::from_error(COMMAND, &error),
        },
        _ => {
            let error = ApplicationError::InvalidInput(
                "exactly one of --spend or --orders is required".to_string(),
            );
            return CommandResult::from_error(COMMAND, &error);
        }
    };

    let message = format!("{} tier with {} point(s)", snapshot.tier.as_str(), snapshot.points);
    CommandResult::success_with_data(COMMAND, message, snapshot)
}

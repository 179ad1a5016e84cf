pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use storefront_core::config::{ConfigOverrides, LoadOptions};
use storefront_core::errors::ApplicationError;
use storefront_core::StorefrontConfig;
use tracing::info;
use uuid::Uuid;

use crate::commands::{CommandResult, RunContext};

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront scoring engine CLI",
    long_about = "Run catalog search, fallback recommendations, loyalty tiers, and fraud scoring against local JSON inputs.",
    after_help = "Examples:\n  storefront search --catalog catalog.json --query \"blue lamp\"\n  storefront loyalty --spend 2500\n  storefront fraud --email a@mailinator.com --total 1500 --recent-orders 3\n  storefront config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Explicit config file (defaults to storefront.toml)")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level for this invocation")]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Rank catalog items against a free-text query")]
    Search(commands::search::SearchArgs),
    #[command(about = "Serve fallback recommendations from a browsing context")]
    Recommend(commands::recommend::RecommendArgs),
    #[command(about = "Compute loyalty points, tier, and progress to the next tier")]
    Loyalty(commands::loyalty::LoyaltyArgs),
    #[command(about = "Score an order for fraud risk")]
    Fraud(commands::fraud::FraudArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::Recommend(_) => "recommend",
            Self::Loyalty(_) => "loyalty",
            Self::Fraud(_) => "fraud",
            Self::Config => "config",
        }
    }
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_file: self.config.is_some(),
            config_path: self.config.clone(),
            overrides: ConfigOverrides { log_level: self.log_level.clone(), ..Default::default() },
        }
    }
}

pub fn load_config(cli: &Cli) -> Result<StorefrontConfig, CommandResult> {
    StorefrontConfig::load(cli.load_options()).map_err(|error| {
        CommandResult::from_error(cli.command.name(), &ApplicationError::from(error))
    })
}

/// Dispatch a parsed command against an already loaded config.
pub fn execute(cli: &Cli, context: &RunContext) -> CommandResult {
    info!(
        event_name = "storefront.cli.command.started",
        correlation_id = context.correlation_id.as_str(),
        command = cli.command.name(),
        "command started"
    );

    let result = match &cli.command {
        Command::Search(args) => commands::search::run(args, context),
        Command::Recommend(args) => commands::recommend::run(args, context),
        Command::Loyalty(args) => commands::loyalty::run(args),
        Command::Fraud(args) => commands::fraud::run(args, context),
        Command::Config => commands::config::run(
            &context.config,
            cli.config.as_deref(),
            &cli.load_options().overrides,
        ),
    };

    info!(
        event_name = "storefront.cli.command.finished",
        correlation_id = context.correlation_id.as_str(),
        command = cli.command.name(),
        exit_code = result.exit_code,
        "command finished"
    );
    result
}

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let result = match load_config(&cli) {
        Ok(config) => {
            logging::init_logging(&config)?;
            let context = RunContext::new(config, Uuid::new_v4().to_string());
            execute(&cli, &context)
        }
        Err(failure) => failure,
    };

    println!("{}", result.output);
    Ok(ExitCode::from(result.exit_code))
}

use std::io;

use anyhow::anyhow;
use storefront_core::config::LogFormat;
use storefront_core::StorefrontConfig;
use tracing::Level;

/// Installs the global subscriber. Logs go to stderr so stdout carries only
/// the command payload.
pub fn init_logging(config: &StorefrontConfig) -> anyhow::Result<()> {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}

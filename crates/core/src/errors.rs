use thiserror::Error;

use crate::config::ConfigError;

/// Failures at the edges of the engines. The scoring functions themselves are
/// total and never return these.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("catalog source failure: {0}")]
    Catalog(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApplicationError {
    /// Stable identifier used in machine-readable command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::Catalog(_) => "catalog_unavailable",
            Self::InvalidInput(_) => "invalid_input",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Catalog(_) | Self::InvalidInput(_) => 3,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "The storefront is misconfigured.",
            Self::Catalog(_) => "Products are temporarily unavailable. Please retry shortly.",
            Self::InvalidInput(_) => "The request could not be processed. Check inputs and try again.",
        }
    }
}

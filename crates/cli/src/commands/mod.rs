pub mod config;
pub mod fraud;
pub mod loyalty;
pub mod recommend;
pub mod search;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use storefront_core::errors::ApplicationError;
use storefront_core::storefront::{CatalogSource, Storefront};
use storefront_core::{CatalogItem, StorefrontConfig};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Shared state for one CLI invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: StorefrontConfig,
    pub correlation_id: String,
}

impl RunContext {
    pub fn new(config: StorefrontConfig, correlation_id: impl Into<String>) -> Self {
        Self { config, correlation_id: correlation_id.into() }
    }

    pub fn storefront<S: CatalogSource>(&self, source: S) -> Storefront<S> {
        Storefront::new(source, &self.config).with_correlation_id(self.correlation_id.clone())
    }
}

/// Catalog read from a JSON array of catalog items.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for JsonFileCatalog {
    fn load_catalog(&self) -> Result<Vec<CatalogItem>, ApplicationError> {
        read_json(&self.path).map_err(|error| match error {
            ApplicationError::InvalidInput(message) => ApplicationError::Catalog(message),
            other => other,
        })
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::InvalidInput(format!("could not read `{}`: {error}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|error| {
        ApplicationError::InvalidInput(format!("could not parse `{}`: {error}", path.display()))
    })
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use storefront_core::config::ConfigOverrides;
use storefront_core::StorefrontConfig;
use toml::Value;

use crate::commands::CommandResult;

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

/// Effective configuration with per-key source attribution.
pub fn run(
    config: &StorefrontConfig,
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> CommandResult {
    let file_path = detect_config_path(config_path);
    let file_doc = load_config_file_doc(file_path.as_deref());
    let sources = SourceLookup { file_doc: file_doc.as_ref(), file_path: file_path.as_deref() };

    let mut entries = vec![
        sources.entry(
            "cache.ttl_secs",
            config.cache.ttl_secs.to_string(),
            &["STOREFRONT_CACHE_TTL_SECS"],
        ),
        sources.entry(
            "search.max_results",
            config.search.max_results.to_string(),
            &["STOREFRONT_SEARCH_MAX_RESULTS"],
        ),
        sources.entry(
            "recommendations.default_limit",
            config.recommendations.default_limit.to_string(),
            &["STOREFRONT_RECOMMENDATIONS_DEFAULT_LIMIT"],
        ),
        sources.entry(
            "fraud.risky_above",
            config.fraud.risky_above.to_string(),
            &["STOREFRONT_FRAUD_RISKY_ABOVE"],
        ),
        sources.entry(
            "fraud.block_at",
            config.fraud.block_at.to_string(),
            &["STOREFRONT_FRAUD_BLOCK_AT"],
        ),
        sources.entry(
            "fraud.extra_disposable_domains",
            render_list(&config.fraud.extra_disposable_domains),
            &["STOREFRONT_FRAUD_EXTRA_DISPOSABLE_DOMAINS"],
        ),
        sources.entry(
            "logging.level",
            config.logging.level.clone(),
            &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"],
        ),
        sources.entry(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
        ),
    ];

    for entry in &mut entries {
        let overridden = match entry.key {
            "cache.ttl_secs" => overrides.cache_ttl_secs.is_some(),
            "logging.level" => overrides.log_level.is_some(),
            "logging.format" => overrides.log_format.is_some(),
            _ => false,
        };
        if overridden {
            entry.source = "override".to_string();
        }
    }

    CommandResult::success_with_data(
        COMMAND,
        "effective config (source precedence: override > env > file > default)",
        entries,
    )
}

struct SourceLookup<'a> {
    file_doc: Option<&'a Value>,
    file_path: Option<&'a Path>,
}

impl SourceLookup<'_> {
    fn entry(&self, key: &'static str, value: String, env_keys: &[&str]) -> ConfigEntry {
        ConfigEntry { key, value, source: self.source_of(key, env_keys) }
    }

    fn source_of(&self, key_path: &str, env_keys: &[&str]) -> String {
        let is_set = |key: &str| env::var(key).is_ok_and(|value| !value.trim().is_empty());
        if let Some(env_key) = env_keys.iter().find(|env_key| is_set(**env_key)) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    ["storefront.toml", "config/storefront.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_list(values: &[String]) -> String {
    if values.is_empty() {
        return "<none>".to_string();
    }
    values.join(",")
}

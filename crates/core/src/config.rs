use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fraud::{FraudScorer, FraudThresholds};

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    pub cache: CacheConfig,
    pub search: SearchConfig,
    pub recommendations: RecommendationsConfig,
    pub fraud: FraudConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub max_results: usize,
}

#[derive(Clone, Debug)]
pub struct RecommendationsConfig {
    pub default_limit: usize,
}

#[derive(Clone, Debug)]
pub struct FraudConfig {
    pub risky_above: u32,
    pub block_at: u32,
    pub extra_disposable_domains: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub cache_ttl_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        let thresholds = FraudThresholds::default();
        Self {
            cache: CacheConfig { ttl_secs: 300 },
            search: SearchConfig { max_results: 50 },
            recommendations: RecommendationsConfig { default_limit: 8 },
            fraud: FraudConfig {
                risky_above: thresholds.risky_above,
                block_at: thresholds.block_at,
                extra_disposable_domains: Vec::new(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl StorefrontConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("storefront.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn fraud_thresholds(&self) -> FraudThresholds {
        FraudThresholds { risky_above: self.fraud.risky_above, block_at: self.fraud.block_at }
    }

    pub fn fraud_scorer(&self) -> FraudScorer {
        FraudScorer::new(self.fraud_thresholds())
            .with_extra_domains(&self.fraud.extra_disposable_domains)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(cache) = patch.cache {
            if let Some(ttl_secs) = cache.ttl_secs {
                self.cache.ttl_secs = ttl_secs;
            }
        }

        if let Some(search) = patch.search {
            if let Some(max_results) = search.max_results {
                self.search.max_results = max_results;
            }
        }

        if let Some(recommendations) = patch.recommendations {
            if let Some(default_limit) = recommendations.default_limit {
                self.recommendations.default_limit = default_limit;
            }
        }

        if let Some(fraud) = patch.fraud {
            if let Some(risky_above) = fraud.risky_above {
                self.fraud.risky_above = risky_above;
            }
            if let Some(block_at) = fraud.block_at {
                self.fraud.block_at = block_at;
            }
            if let Some(domains) = fraud.extra_disposable_domains {
                self.fraud.extra_disposable_domains = domains;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STOREFRONT_CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_u64("STOREFRONT_CACHE_TTL_SECS", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_SEARCH_MAX_RESULTS") {
            self.search.max_results = parse_usize("STOREFRONT_SEARCH_MAX_RESULTS", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_DEFAULT_LIMIT") {
            self.recommendations.default_limit =
                parse_usize("STOREFRONT_RECOMMENDATIONS_DEFAULT_LIMIT", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_FRAUD_RISKY_ABOVE") {
            self.fraud.risky_above = parse_u32("STOREFRONT_FRAUD_RISKY_ABOVE", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_FRAUD_BLOCK_AT") {
            self.fraud.block_at = parse_u32("STOREFRONT_FRAUD_BLOCK_AT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_FRAUD_EXTRA_DISPOSABLE_DOMAINS") {
            self.fraud.extra_disposable_domains = value
                .split(',')
                .map(str::trim)
                .filter(|domain| !domain.is_empty())
                .map(str::to_string)
                .collect();
        }

        let log_level =
            read_env("STOREFRONT_LOGGING_LEVEL").or_else(|| read_env("STOREFRONT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREFRONT_LOGGING_FORMAT").or_else(|| read_env("STOREFRONT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(ttl_secs) = overrides.cache_ttl_secs {
            self.cache.ttl_secs = ttl_secs;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_cache(&self.cache)?;
        validate_limits(&self.search, &self.recommendations)?;
        validate_fraud(&self.fraud)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_cache(cache: &CacheConfig) -> Result<(), ConfigError> {
    if cache.ttl_secs == 0 || cache.ttl_secs > 86_400 {
        return Err(ConfigError::Validation(
            "cache.ttl_secs must be in range 1..=86400".to_string(),
        ));
    }

    Ok(())
}

fn validate_limits(
    search: &SearchConfig,
    recommendations: &RecommendationsConfig,
) -> Result<(), ConfigError> {
    if search.max_results == 0 {
        return Err(ConfigError::Validation(
            "search.max_results must be greater than zero".to_string(),
        ));
    }

    if recommendations.default_limit == 0 {
        return Err(ConfigError::Validation(
            "recommendations.default_limit must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_fraud(fraud: &FraudConfig) -> Result<(), ConfigError> {
    if fraud.block_at < fraud.risky_above {
        return Err(ConfigError::Validation(format!(
            "fraud.block_at ({}) must not be below fraud.risky_above ({})",
            fraud.block_at, fraud.risky_above
        )));
    }

    if let Some(domain) = fraud.extra_disposable_domains.iter().find(|domain| domain.contains('@')) {
        return Err(ConfigError::Validation(format!(
            "fraud.extra_disposable_domains entries must be bare domains, got `{domain}`"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    cache: Option<CachePatch>,
    search: Option<SearchPatch>,
    recommendations: Option<RecommendationsPatch>,
    fraud: Option<FraudPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CachePatch {
    ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationsPatch {
    default_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct FraudPatch {
    risky_above: Option<u32>,
    block_at: Option<u32>,
    extra_disposable_domains: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

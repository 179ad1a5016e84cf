use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use clap::Parser;
use rust_decimal::Decimal;
use serde_json::Value;
use storefront_cli::commands::fraud::FraudArgs;
use storefront_cli::commands::loyalty::LoyaltyArgs;
use storefront_cli::commands::recommend::RecommendArgs;
use storefront_cli::commands::search::SearchArgs;
use storefront_cli::commands::{config, fraud, loyalty, recommend, search, RunContext};
use storefront_cli::{execute, load_config, Cli};
use storefront_core::StorefrontConfig;
use tempfile::TempDir;

const CATALOG_JSON: &str = r#"[
  {"id": "1", "name": "Blue Lamp", "category": "lighting", "price": "20.00"},
  {"id": "2", "name": "Lamp Blue Deluxe", "category": "lighting", "tags": ["sale"],
   "price": "40.00", "discount": "10"},
  {"id": "3", "name": "Linen Throw", "category": "textiles", "price": "35.00"}
]"#;

#[test]
fn search_ranks_catalog_file_and_keeps_ties_in_catalog_order() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_file(&dir, "catalog.json", CATALOG_JSON);

    let args = SearchArgs { catalog, query: "blue lamp".to_string(), limit: None };
    let result = search::run(&args, &context());
    assert_eq!(result.exit_code, 0, "expected successful search: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "search");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["data"]["result_count"], 2);
    assert_eq!(payload["data"]["results"][0]["product_id"], "1");
    assert_eq!(payload["data"]["results"][0]["score"], 135);
    assert_eq!(payload["data"]["results"][1]["product_id"], "2");
    assert_eq!(payload["data"]["results"][1]["score"], 135);
}

#[test]
fn search_with_blank_query_returns_empty_results() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_file(&dir, "catalog.json", CATALOG_JSON);

    let args = SearchArgs { catalog, query: "   ".to_string(), limit: Some(5) };
    let payload = parse_payload(&search::run(&args, &context()).output);

    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["data"]["result_count"], 0);
}

#[test]
fn search_reports_missing_catalog_as_catalog_unavailable() {
    let dir = TempDir::new().expect("tempdir");
    let args = SearchArgs {
        catalog: dir.path().join("missing.json"),
        query: "lamp".to_string(),
        limit: None,
    };

    let result = search::run(&args, &context());
    assert_eq!(result.exit_code, 3);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "catalog_unavailable");
    assert!(payload.get("data").is_none());
}

#[test]
fn recommend_excludes_recently_viewed_and_favours_purchased_categories() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_file(&dir, "catalog.json", CATALOG_JSON);
    let browsing = write_file(
        &dir,
        "context.json",
        r#"{"purchased_categories": ["textiles"], "recently_viewed": ["1"]}"#,
    );

    let args = RecommendArgs {
        catalog,
        context: Some(browsing),
        limit: Some(2),
        seed: None,
        no_jitter: true,
    };
    let result = recommend::run(&args, &context());
    assert_eq!(result.exit_code, 0, "expected recommendations: {}", result.output);

    let payload = parse_payload(&result.output);
    let ids: Vec<&str> = payload["data"]["picks"]
        .as_array()
        .expect("picks array")
        .iter()
        .filter_map(|pick| pick["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["3", "2"]);
}

#[test]
fn recommend_with_seed_is_repeatable() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_file(&dir, "catalog.json", CATALOG_JSON);
    let args = RecommendArgs { catalog, context: None, limit: None, seed: Some(7), no_jitter: false };

    let first = parse_payload(&recommend::run(&args, &context()).output);
    let second = parse_payload(&recommend::run(&args, &context()).output);

    assert_eq!(first["data"], second["data"]);
    assert_eq!(first["data"]["result_count"], 3);
}

#[test]
fn recommend_rejects_malformed_context() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = write_file(&dir, "catalog.json", CATALOG_JSON);
    let browsing = write_file(&dir, "context.json", "{not json");

    let args = RecommendArgs {
        catalog,
        context: Some(browsing),
        limit: None,
        seed: None,
        no_jitter: true,
    };
    let result = recommend::run(&args, &context());
    assert_eq!(result.exit_code, 3);
    assert_eq!(parse_payload(&result.output)["error_class"], "invalid_input");
}

#[test]
fn loyalty_from_spend_reports_tier_progress() {
    let args = LoyaltyArgs { spend: Some(Decimal::new(49_999, 2)), orders: None };
    let payload = parse_payload(&loyalty::run(&args).output);

    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["data"]["points"], 499);
    assert_eq!(payload["data"]["tier"], "bronze");
    assert_eq!(payload["data"]["points_to_next_tier"], 1);
}

#[test]
fn loyalty_from_orders_counts_only_paid_orders() {
    let dir = TempDir::new().expect("tempdir");
    let orders = write_file(
        &dir,
        "orders.json",
        r#"[
          {"total": "1500", "payment_status": "paid", "created_at": "2024-05-01T09:00:00Z"},
          {"total": "900", "payment_status": "refunded", "created_at": "2024-05-02T09:00:00Z"},
          {"total": "600", "payment_status": "paid", "created_at": "2024-05-03T09:00:00Z"}
        ]"#,
    );

    let args = LoyaltyArgs { spend: None, orders: Some(orders) };
    let payload = parse_payload(&loyalty::run(&args).output);

    assert_eq!(payload["data"]["points"], 2100);
    assert_eq!(payload["data"]["tier"], "gold");
    assert_eq!(payload["data"]["discount_percent"], 10);
}

#[test]
fn loyalty_without_input_is_invalid() {
    let result = loyalty::run(&LoyaltyArgs { spend: None, orders: None });
    assert_eq!(result.exit_code, 3);
    assert_eq!(parse_payload(&result.output)["error_class"], "invalid_input");
}

#[test]
fn fraud_blocks_velocity_disposable_and_large_order() {
    let args = FraudArgs {
        recent_orders: 3,
        ..fraud_args("buyer@Mailinator.com", Decimal::from(1_500))
    };

    let payload = parse_payload(&fraud::run(&args, &context()).output);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["data"]["risk_score"], 85);
    assert_eq!(payload["data"]["is_risky"], true);
    assert_eq!(payload["data"]["should_block"], true);
    assert_eq!(payload["data"]["signals"].as_array().map(Vec::len), Some(3));
}

#[test]
fn fraud_new_account_rule_needs_a_signed_in_user() {
    let anonymous = FraudArgs {
        account_age_days: Some(0.5),
        ..fraud_args("buyer@example.com", Decimal::from(600))
    };
    let signed_in = FraudArgs { user_id: Some("user-1".to_string()), ..anonymous.clone() };

    let anonymous = parse_payload(&fraud::run(&anonymous, &context()).output);
    let signed_in = parse_payload(&fraud::run(&signed_in, &context()).output);

    assert_eq!(anonymous["data"]["risk_score"], 0);
    assert_eq!(signed_in["data"]["risk_score"], 25);
    assert_eq!(signed_in["data"]["is_risky"], false);
}

#[test]
fn fraud_rejects_negative_totals() {
    let args = fraud_args("buyer@example.com", Decimal::from(-5));
    let result = fraud::run(&args, &context());

    assert_eq!(result.exit_code, 3);
    assert_eq!(parse_payload(&result.output)["error_class"], "invalid_input");
}

#[test]
fn fraud_thresholds_follow_config() {
    let mut config = StorefrontConfig::default();
    config.fraud.risky_above = 10;
    config.fraud.block_at = 20;
    config.fraud.extra_disposable_domains = vec!["burner.test".to_string()];
    let context = RunContext::new(config, "test-correlation");

    let args = fraud_args("someone@burner.test", Decimal::from(50));
    let payload = parse_payload(&fraud::run(&args, &context).output);

    assert_eq!(payload["data"]["risk_score"], 40);
    assert_eq!(payload["data"]["should_block"], true);
}

#[test]
fn config_reports_env_and_default_sources() {
    with_env(&[("STOREFRONT_CACHE_TTL_SECS", "60")], || {
        let loaded = StorefrontConfig::load(Default::default()).expect("config loads");
        let result = config::run(&loaded, None, &Default::default());
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let entries = payload["data"].as_array().expect("config entries");
        let ttl = entries.iter().find(|entry| entry["key"] == "cache.ttl_secs").expect("ttl entry");
        assert_eq!(ttl["value"], "60");
        assert_eq!(ttl["source"], "env (STOREFRONT_CACHE_TTL_SECS)");

        let level = entries.iter().find(|entry| entry["key"] == "logging.level").expect("level");
        assert_eq!(level["source"], "default");
    });
}

#[test]
fn config_reports_cli_override_for_log_level() {
    with_env(&[("STOREFRONT_LOG_LEVEL", "warn")], || {
        let cli = Cli::try_parse_from(["storefront", "--log-level", "debug", "config"])
            .expect("cli parses");
        let loaded = load_config(&cli).expect("config loads");
        let payload =
            parse_payload(&execute(&cli, &RunContext::new(loaded, "test-correlation")).output);

        let entries = payload["data"].as_array().expect("config entries");
        let level = entries.iter().find(|entry| entry["key"] == "logging.level").expect("level");
        assert_eq!(level["value"], "debug");
        assert_eq!(level["source"], "override");
    });
}

#[test]
fn config_reports_file_source_for_explicit_path() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let path = write_file(&dir, "storefront.toml", "[search]\nmax_results = 12\n");

        let cli = Cli::try_parse_from([
            "storefront",
            "--config",
            path.to_str().expect("utf-8 path"),
            "config",
        ])
        .expect("cli parses");
        let loaded = load_config(&cli).expect("config loads");
        let result = execute(&cli, &RunContext::new(loaded, "test-correlation"));

        let payload = parse_payload(&result.output);
        let entries = payload["data"].as_array().expect("config entries");
        let max = entries.iter().find(|entry| entry["key"] == "search.max_results").expect("max");
        assert_eq!(max["value"], "12");
        assert!(max["source"].as_str().is_some_and(|source| source.starts_with("file (")));
    });
}

#[test]
fn config_ignores_blank_env_values_when_attributing_sources() {
    with_env(&[("STOREFRONT_CACHE_TTL_SECS", "   ")], || {
        let dir = TempDir::new().expect("tempdir");
        let path = write_file(&dir, "storefront.toml", "[cache]\nttl_secs = 90\n");

        let cli = Cli::try_parse_from([
            "storefront",
            "--config",
            path.to_str().expect("utf-8 path"),
            "config",
        ])
        .expect("cli parses");
        let loaded = load_config(&cli).expect("config loads");
        let payload =
            parse_payload(&execute(&cli, &RunContext::new(loaded, "test-correlation")).output);

        let entries = payload["data"].as_array().expect("config entries");
        let ttl = entries.iter().find(|entry| entry["key"] == "cache.ttl_secs").expect("ttl entry");
        assert_eq!(ttl["value"], "90");
        assert!(ttl["source"].as_str().is_some_and(|source| source.starts_with("file (")));
    });
}

#[test]
fn loyalty_orders_with_overflowing_totals_land_in_top_tier() {
    let dir = TempDir::new().expect("tempdir");
    let orders = write_file(
        &dir,
        "orders.json",
        r#"[
          {"total": "79228162514264337593543950335", "payment_status": "paid",
           "created_at": "2024-05-01T09:00:00Z"},
          {"total": "79228162514264337593543950335", "payment_status": "paid",
           "created_at": "2024-05-02T09:00:00Z"}
        ]"#,
    );

    let result = loyalty::run(&LoyaltyArgs { spend: None, orders: Some(orders) });
    assert_eq!(result.exit_code, 0, "expected a snapshot: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["data"]["tier"], "platinum");
    assert_eq!(payload["data"]["points_to_next_tier"], 0);
}

#[test]
fn invalid_env_config_fails_with_config_exit_code() {
    with_env(&[("STOREFRONT_FRAUD_RISKY_ABOVE", "90")], || {
        let cli = Cli::try_parse_from(["storefront", "loyalty", "--spend", "10"]).expect("parses");

        let failure = load_config(&cli).expect_err("block_at below risky_above is rejected");
        assert_eq!(failure.exit_code, 2);

        let payload = parse_payload(&failure.output);
        assert_eq!(payload["command"], "loyalty");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn cli_rejects_spend_and_orders_together() {
    let parsed = Cli::try_parse_from([
        "storefront",
        "loyalty",
        "--spend",
        "10",
        "--orders",
        "orders.json",
    ]);
    assert!(parsed.is_err());
}

fn context() -> RunContext {
    RunContext::new(StorefrontConfig::default(), "test-correlation")
}

fn fraud_args(email: &str, total: Decimal) -> FraudArgs {
    FraudArgs {
        email: email.to_string(),
        total,
        user_id: None,
        recent_orders: 0,
        orders: None,
        account_age_days: None,
        account_created_at: None,
    }
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture should be writable");
    path
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STOREFRONT_CACHE_TTL_SECS",
        "STOREFRONT_SEARCH_MAX_RESULTS",
        "STOREFRONT_RECOMMENDATIONS_DEFAULT_LIMIT",
        "STOREFRONT_FRAUD_RISKY_ABOVE",
        "STOREFRONT_FRAUD_BLOCK_AT",
        "STOREFRONT_FRAUD_EXTRA_DISPOSABLE_DOMAINS",
        "STOREFRONT_LOGGING_LEVEL",
        "STOREFRONT_LOGGING_FORMAT",
        "STOREFRONT_LOG_LEVEL",
        "STOREFRONT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

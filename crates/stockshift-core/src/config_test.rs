use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STOCKSHIFT_ENV"));
}

#[test]
fn build_app_config_defaults_from_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.network_path.to_str(), Some("./config/network.yaml"));
    assert!(cfg.notify_webhook_url.is_none());
    assert_eq!(cfg.notify_timeout_secs, 10);
    assert!((cfg.max_shipping_cost - 120.0).abs() < f64::EPSILON);
    assert_eq!(cfg.engine, EngineSettings::default());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOCKSHIFT_BIND_ADDR"),
        "expected InvalidEnvVar(STOCKSHIFT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn engine_thresholds_can_be_overridden() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_SURPLUS_THRESHOLD", "25");
    map.insert("STOCKSHIFT_SHORTAGE_THRESHOLD", " 12 ");
    map.insert("STOCKSHIFT_FUEL_RATE", "0.05");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.engine.surplus_threshold, 25);
    assert_eq!(cfg.engine.shortage_threshold, 12);
    assert!((cfg.engine.fuel_rate - 0.05).abs() < f64::EPSILON);
}

#[test]
fn negative_rate_is_rejected() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_CO2_PER_MILE", "-0.1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOCKSHIFT_CO2_PER_MILE"),
        "expected InvalidEnvVar(STOCKSHIFT_CO2_PER_MILE), got: {result:?}"
    );
}

#[test]
fn non_numeric_threshold_is_rejected() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_SURPLUS_THRESHOLD", "forty");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOCKSHIFT_SURPLUS_THRESHOLD"),
        "expected InvalidEnvVar(STOCKSHIFT_SURPLUS_THRESHOLD), got: {result:?}"
    );
}

#[test]
fn webhook_url_must_be_http() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_NOTIFY_WEBHOOK_URL", "ftp://hooks.example.com");
    assert!(build_app_config(lookup_from_map(&map)).is_err());

    map.insert("STOCKSHIFT_NOTIFY_WEBHOOK_URL", "https://hooks.example.com/t/abc");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.notify_webhook_url.as_deref(),
        Some("https://hooks.example.com/t/abc")
    );
}

#[test]
fn blank_webhook_url_means_log_only() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_NOTIFY_WEBHOOK_URL", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.notify_webhook_url.is_none());
}

#[test]
fn zero_notify_timeout_is_rejected() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_NOTIFY_TIMEOUT_SECS", "0");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn shipping_cap_below_minimum_is_rejected() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_MAX_SHIPPING_COST", "10");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOCKSHIFT_MAX_SHIPPING_COST"),
        "expected InvalidEnvVar(STOCKSHIFT_MAX_SHIPPING_COST), got: {result:?}"
    );
}

#[test]
fn debug_redacts_webhook_url() {
    let mut map = HashMap::new();
    map.insert("STOCKSHIFT_NOTIFY_WEBHOOK_URL", "https://hooks.example.com/secret-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret-token"));
    assert!(rendered.contains("[redacted]"));
}

use crate::app_config::{AppConfig, Environment};
use crate::settings::EngineSettings;
use crate::shipping::MIN_SHIPPING_COST;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Does not read `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn invalid(var: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse and validate configuration from an env-var lookup.
///
/// Every variable has a default, so an empty environment yields a working
/// development config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e))
    };

    let parse_rate = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e))?;
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(invalid(var, "must be a finite, non-negative number"))
        }
    };

    let env = parse_environment(&or_default("STOCKSHIFT_ENV", "development"))?;

    let bind_addr = or_default("STOCKSHIFT_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("STOCKSHIFT_BIND_ADDR", e))?;
    let log_level = or_default("STOCKSHIFT_LOG_LEVEL", "info");
    let network_path = PathBuf::from(or_default(
        "STOCKSHIFT_NETWORK_PATH",
        "./config/network.yaml",
    ));

    let notify_webhook_url = match lookup("STOCKSHIFT_NOTIFY_WEBHOOK_URL") {
        Ok(url) if url.trim().is_empty() => None,
        Ok(url) => {
            let url = url.trim().to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(
                    "STOCKSHIFT_NOTIFY_WEBHOOK_URL",
                    "must be an http:// or https:// URL",
                ));
            }
            Some(url)
        }
        Err(_) => None,
    };
    let notify_timeout_secs = parse_u64("STOCKSHIFT_NOTIFY_TIMEOUT_SECS", "10")?;
    if notify_timeout_secs == 0 {
        return Err(invalid("STOCKSHIFT_NOTIFY_TIMEOUT_SECS", "must be at least 1"));
    }

    let max_shipping_cost = parse_rate("STOCKSHIFT_MAX_SHIPPING_COST", "120")?;
    if max_shipping_cost < MIN_SHIPPING_COST {
        return Err(invalid(
            "STOCKSHIFT_MAX_SHIPPING_COST",
            format!("must be at least {MIN_SHIPPING_COST}"),
        ));
    }

    let defaults = EngineSettings::default();
    let engine = EngineSettings {
        surplus_threshold: parse_u32("STOCKSHIFT_SURPLUS_THRESHOLD", "40")?,
        shortage_threshold: parse_u32("STOCKSHIFT_SHORTAGE_THRESHOLD", "30")?,
        avoided_loss_per_unit: parse_rate("STOCKSHIFT_AVOIDED_LOSS_PER_UNIT", "2")?,
        fuel_rate: parse_rate("STOCKSHIFT_FUEL_RATE", "0.03")?,
        co2_per_mile: parse_rate("STOCKSHIFT_CO2_PER_MILE", "0.02")?,
        nominal_cpi: defaults.nominal_cpi,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        network_path,
        notify_webhook_url,
        notify_timeout_secs,
        max_shipping_cost,
        engine,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "STOCKSHIFT_ENV",
            format!("unknown environment '{other}'; expected development, test, or production"),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

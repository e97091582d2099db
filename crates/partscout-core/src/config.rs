use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub(crate) const DEFAULT_GENERAL_SEARCH_URL: &str = "https://www.google.com/search?q={query}";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PARTSCOUT_ENV", "development"))?;

    let bind_addr = or_default("PARTSCOUT_BIND_ADDR", "0.0.0.0:5002")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("PARTSCOUT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("PARTSCOUT_LOG_LEVEL", "info");
    let service_name = or_default("PARTSCOUT_SERVICE_NAME", "scraper");
    let sources_path = lookup("PARTSCOUT_SOURCES_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let webdriver_url = or_default("PARTSCOUT_WEBDRIVER_URL", "http://localhost:9515");
    let webdriver_binary = PathBuf::from(or_default(
        "PARTSCOUT_WEBDRIVER_BINARY",
        "/usr/bin/chromedriver",
    ));
    let webdriver_fallback_port = or_default("PARTSCOUT_WEBDRIVER_FALLBACK_PORT", "9516")
        .parse::<u16>()
        .map_err(|e| invalid("PARTSCOUT_WEBDRIVER_FALLBACK_PORT", e.to_string()))?;
    let webdriver_startup_timeout_secs =
        parse_u64("PARTSCOUT_WEBDRIVER_STARTUP_TIMEOUT_SECS", "10")?;
    let headless = parse_bool("PARTSCOUT_HEADLESS", &or_default("PARTSCOUT_HEADLESS", "true"))?;
    let user_agent = or_default("PARTSCOUT_USER_AGENT", DEFAULT_USER_AGENT);

    let general_search_url =
        or_default("PARTSCOUT_GENERAL_SEARCH_URL", DEFAULT_GENERAL_SEARCH_URL);
    if !general_search_url.contains("{query}") {
        return Err(invalid(
            "PARTSCOUT_GENERAL_SEARCH_URL",
            "template must contain a {query} placeholder".to_string(),
        ));
    }

    let general_result_limit = parse_usize("PARTSCOUT_GENERAL_RESULT_LIMIT", "5")?;
    let specialized_result_limit = parse_usize("PARTSCOUT_SPECIALIZED_RESULT_LIMIT", "3")?;
    if specialized_result_limit > general_result_limit {
        return Err(invalid(
            "PARTSCOUT_SPECIALIZED_RESULT_LIMIT",
            format!("{specialized_result_limit} exceeds general limit {general_result_limit}"),
        ));
    }

    let general_wait_secs = parse_u64("PARTSCOUT_GENERAL_WAIT_SECS", "10")?;
    let specialized_wait_secs = parse_u64("PARTSCOUT_SPECIALIZED_WAIT_SECS", "15")?;
    let settle_delay_ms = parse_u64("PARTSCOUT_SETTLE_DELAY_MS", "3000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        service_name,
        sources_path,
        webdriver_url,
        webdriver_binary,
        webdriver_fallback_port,
        webdriver_startup_timeout_secs,
        headless,
        user_agent,
        general_search_url,
        general_result_limit,
        specialized_result_limit,
        general_wait_secs,
        specialized_wait_secs,
        settle_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PARTSCOUT_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

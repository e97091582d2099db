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
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PARTSCOUT_ENV"));
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5002");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.service_name, "scraper");
    assert!(cfg.sources_path.is_none());
    assert_eq!(cfg.webdriver_url, "http://localhost:9515");
    assert_eq!(
        cfg.webdriver_binary,
        std::path::PathBuf::from("/usr/bin/chromedriver")
    );
    assert_eq!(cfg.webdriver_fallback_port, 9516);
    assert!(cfg.headless);
    assert_eq!(cfg.general_search_url, DEFAULT_GENERAL_SEARCH_URL);
    assert_eq!(cfg.general_result_limit, 5);
    assert_eq!(cfg.specialized_result_limit, 3);
    assert_eq!(cfg.general_wait_secs, 10);
    assert_eq!(cfg.specialized_wait_secs, 15);
    assert_eq!(cfg.settle_delay_ms, 3000);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("PARTSCOUT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PARTSCOUT_BIND_ADDR"),
        "expected InvalidEnvVar(PARTSCOUT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_search_url_without_placeholder() {
    let mut map = HashMap::new();
    map.insert("PARTSCOUT_GENERAL_SEARCH_URL", "https://search.example.com/");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PARTSCOUT_GENERAL_SEARCH_URL"),
        "expected InvalidEnvVar(PARTSCOUT_GENERAL_SEARCH_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_specialized_limit_above_general_limit() {
    let mut map = HashMap::new();
    map.insert("PARTSCOUT_GENERAL_RESULT_LIMIT", "2");
    map.insert("PARTSCOUT_SPECIALIZED_RESULT_LIMIT", "3");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PARTSCOUT_SPECIALIZED_RESULT_LIMIT"),
        "expected InvalidEnvVar(PARTSCOUT_SPECIALIZED_RESULT_LIMIT), got: {result:?}"
    );
}

#[test]
fn build_app_config_settle_delay_override() {
    let mut map = HashMap::new();
    map.insert("PARTSCOUT_SETTLE_DELAY_MS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.settle_delay_ms, 0);
    assert_eq!(cfg.settle_delay(), std::time::Duration::ZERO);
}

#[test]
fn build_app_config_settle_delay_invalid() {
    let mut map = HashMap::new();
    map.insert("PARTSCOUT_SETTLE_DELAY_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PARTSCOUT_SETTLE_DELAY_MS"),
        "expected InvalidEnvVar(PARTSCOUT_SETTLE_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_headless_accepts_false() {
    let mut map = HashMap::new();
    map.insert("PARTSCOUT_HEADLESS", "false");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.headless);
}

#[test]
fn build_app_config_headless_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("PARTSCOUT_HEADLESS", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PARTSCOUT_HEADLESS"),
        "expected InvalidEnvVar(PARTSCOUT_HEADLESS), got: {result:?}"
    );
}

#[test]
fn build_app_config_blank_sources_path_is_ignored() {
    let mut map = HashMap::new();
    map.insert("PARTSCOUT_SOURCES_PATH", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.sources_path.is_none());
}

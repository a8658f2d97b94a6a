use ak_helper::config::{self, ConfigError};
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

// Tests touching process env vars run one at a time.
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[test]
fn test_sanitize_base_url_removes_trailing_slash() {
    assert_eq!(
        config::sanitize_base_url("https://id.example.test/helper/"),
        "https://id.example.test/helper"
    );
}

#[test]
fn test_sanitize_base_url_multiple_trailing_slashes() {
    assert_eq!(
        config::sanitize_base_url("https://id.example.test/helper///"),
        "https://id.example.test/helper"
    );
}

#[test]
fn test_sanitize_base_url_with_whitespace() {
    assert_eq!(
        config::sanitize_base_url("  https://id.example.test/helper/  "),
        "https://id.example.test/helper"
    );
}

#[test]
fn test_sanitize_base_url_empty_string() {
    assert_eq!(config::sanitize_base_url(""), "http://localhost:5000");
    assert_eq!(config::sanitize_base_url("   "), "http://localhost:5000");
}

#[test]
fn test_login_url_is_joined_to_backend() {
    assert_eq!(config::login_url("https://id.example.test/"), "https://id.example.test/login");
}

#[test]
fn test_get_api_base_url_with_trailing_slash() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    env::set_var("API_BASE_URL", "https://id.example.test/helper/");

    assert_eq!(config::get_api_base_url(), "https://id.example.test/helper");

    env::remove_var("API_BASE_URL");
}

#[test]
fn test_get_api_base_url_uses_default() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    env::remove_var("API_BASE_URL");

    // DEFAULT_API_BASE_URL is empty, so sanitize_base_url returns localhost fallback
    assert_eq!(config::get_api_base_url(), "http://localhost:5000");
}

#[test]
fn test_prefs_path_default_and_disabled() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    env::remove_var("PREFS_PATH");
    assert_eq!(
        config::get_prefs_path().as_deref(),
        Some(std::path::Path::new(config::DEFAULT_PREFS_PATH))
    );

    env::set_var("PREFS_PATH", "  ");
    assert_eq!(config::get_prefs_path(), None);

    env::remove_var("PREFS_PATH");
}

#[test]
fn test_port_and_log_level() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    env::remove_var("PORT");
    assert_eq!(config::get_port(), Ok(config::DEFAULT_PORT));

    env::set_var("PORT", "9100");
    assert_eq!(config::get_port(), Ok(9100));

    env::set_var("PORT", "http");
    assert_eq!(config::get_port(), Err(ConfigError::InvalidPort("http".to_string())));
    env::remove_var("PORT");

    env::set_var("LOG_LEVEL", " DEBUG ");
    assert_eq!(config::get_log_level(), "debug");
    env::remove_var("LOG_LEVEL");
    assert_eq!(config::get_log_level(), config::DEFAULT_LOG_LEVEL);
}

#[test]
fn test_validate_base_url_requires_http_scheme() {
    assert!(config::validate_base_url("https://id.example.test").is_ok());
    assert!(config::validate_base_url("http://localhost:5000").is_ok());
    assert!(matches!(
        config::validate_base_url("id.example.test"),
        Err(ConfigError::InvalidBaseUrl(_))
    ));
}

#[test]
fn test_require_api_token_rejects_missing_or_blank() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    env::remove_var("API_TOKEN");
    assert_eq!(config::require_api_token(), Err(ConfigError::MissingApiToken));

    env::set_var("API_TOKEN", "   ");
    assert_eq!(config::require_api_token(), Err(ConfigError::MissingApiToken));

    env::set_var("API_TOKEN", " secret-token ");
    assert_eq!(config::require_api_token(), Ok("secret-token".to_string()));
    env::remove_var("API_TOKEN");
}

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MOCK_PORT: u16 = 8001;
pub const DEFAULT_API_BASE_URL: &str = "";
pub const DEFAULT_API_TOKEN: &str = "";
pub const DEFAULT_PREFS_PATH: &str = "ak-helper-prefs.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("API_BASE_URL must start with http:// or https:// (got {0:?})")]
    InvalidBaseUrl(String),
    #[error("PORT must be a number between 1 and 65535 (got {0:?})")]
    InvalidPort(String),
    #[error("API_TOKEN must be set; the panel authenticates to the backend with it")]
    MissingApiToken,
}

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_host() -> String {
    env::var("HOST")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string())
}

pub fn get_port() -> Result<u16, ConfigError> {
    match env::var("PORT") {
        Ok(raw) if !raw.trim().is_empty() => parse_port(&raw),
        _ => Ok(DEFAULT_PORT),
    }
}

pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(ConfigError::InvalidPort(raw.to_string())),
    }
}

/// Base URL of the backend that serves `/guest-users`, `/promote`, etc.
pub fn get_api_base_url() -> String {
    sanitize_base_url(&env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()))
}

pub fn get_api_token() -> String {
    env::var("API_TOKEN").unwrap_or_else(|_| DEFAULT_API_TOKEN.to_string())
}

/// The bearer token, which is the only credential the panel forwards. Browser
/// sessions on the backend never reach this process.
pub fn require_api_token() -> Result<String, ConfigError> {
    let token = get_api_token();
    if token.trim().is_empty() {
        return Err(ConfigError::MissingApiToken);
    }
    Ok(token.trim().to_string())
}

/// Location of the preference file. An empty `PREFS_PATH` disables persistence.
pub fn get_prefs_path() -> Option<PathBuf> {
    let raw = env::var("PREFS_PATH").unwrap_or_else(|_| DEFAULT_PREFS_PATH.to_string());
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

pub fn get_log_level() -> String {
    env::var("LOG_LEVEL")
        .map(|v| v.trim().to_lowercase())
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Where the browser is sent when the backend session has expired.
pub fn login_url(api_base_url: &str) -> String {
    format!("{}{}", api_base_url.trim_end_matches('/'), LOGIN_PATH)
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "http://localhost:5000".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn validate_base_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidBaseUrl(url.to_string()))
    }
}

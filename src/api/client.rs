use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use yansi::Paint;

use crate::config::LOGIN_PATH;
use crate::utils::is_truthy;

static SILENT: AtomicBool = AtomicBool::new(false);

pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

fn log_output(msg: String) {
    if !SILENT.load(Ordering::Relaxed) {
        println!("{}", msg);
    }
}

/// Failures surfaced by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session expired; the navigator has been pointed at the login page.
    #[error("redirected to login")]
    AuthRedirect,

    /// A non-JSON response that was not an auth failure.
    #[error("unexpected response {status}")]
    UnexpectedResponse { status: u16 },

    #[error("invalid json response")]
    InvalidJson,

    /// A JSON error body from the backend.
    #[error("{message}")]
    Api { message: String, status: u16, body: Value },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedResponse { status } | ApiError::Api { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::AuthRedirect | ApiError::InvalidJson => None,
        }
    }
}

/// Receives full-page navigations requested by the client (session expiry).
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// Navigator that remembers the last requested location until the web layer
/// turns it into a redirect.
#[derive(Clone, Default)]
pub struct PendingNavigation(Arc<Mutex<Option<String>>>);

impl PendingNavigation {
    pub fn take(&self) -> Option<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn peek(&self) -> Option<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for PendingNavigation {
    fn navigate(&self, location: &str) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(location.to_string());
    }
}

/// Build the shared HTTP client. It keeps no cookies: sessions share it, and
/// the bearer token is the only credential sent to the backend.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(format!("ak-helper/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Pick the human readable reason out of a JSON error body.
pub fn error_message(body: &Value, status: u16) -> String {
    ["detail", "error", "message"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find(|v| is_truthy(v))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| format!("http {}", status))
}

/// JSON-only client for the backend API.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        ApiClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            navigator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.fetch(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.fetch(Method::POST, path, Some(body)).await
    }

    /// Perform one request and enforce the JSON response contract.
    pub async fn fetch(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        self.log_request(&method, &url, body);

        let mut req = self.client.request(method.clone(), &url);
        if !self.api_token.is_empty() {
            req = req.header(AUTHORIZATION, format!("Bearer {}", self.api_token));
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let redirected = reqwest::Url::parse(&url).map(|u| &u != resp.url()).unwrap_or(false);
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("application/json") {
            if redirected || final_url.contains(LOGIN_PATH) || status == 401 || status == 303 {
                tracing::warn!(%method, path, status, "backend session expired, redirecting to login");
                self.navigator.navigate(LOGIN_PATH);
                return Err(ApiError::AuthRedirect);
            }
            tracing::warn!(%method, path, status, %content_type, "non-json response from backend");
            return Err(ApiError::UnexpectedResponse { status });
        }

        let bytes = resp.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(%method, path, error = %e, "backend returned malformed json");
            ApiError::InvalidJson
        })?;

        let response_str = Paint::new(payload.to_string()).rgb(100, 100, 100).to_string();
        log_output(format!("Response:\n{}", response_str));

        if !(200..300).contains(&status) {
            let message = error_message(&payload, status);
            tracing::info!(%method, path, status, %message, "backend rejected request");
            return Err(ApiError::Api { message, status, body: payload });
        }
        tracing::debug!(%method, path, status, "backend request ok");
        Ok(payload)
    }

    fn log_request(&self, method: &Method, url: &str, body: Option<&Value>) {
        if SILENT.load(Ordering::Relaxed) {
            return;
        }
        let mut parts = Vec::new();
        parts.push(Paint::new("curl").fg(yansi::Color::Green).bold().to_string());
        parts.push(format!("-X {}", Paint::new(method.as_str()).fg(yansi::Color::Yellow).bold()));
        parts.push(format!("'{}'", Paint::new(url).fg(yansi::Color::Cyan)));
        if !self.api_token.is_empty() {
            parts.push(format!(
                "{} {}",
                Paint::new("-H").fg(yansi::Color::Magenta),
                Paint::new("'Authorization: Bearer ***'").fg(yansi::Color::Magenta)
            ));
        }
        if let Some(d) = body {
            let escaped_json = d.to_string().replace('\'', "'\\''");
            parts.push(format!(
                "{} {}",
                Paint::new("-H").fg(yansi::Color::Magenta),
                Paint::new("'Content-Type: application/json'").fg(yansi::Color::Magenta)
            ));
            parts.push(format!(
                "{} {}",
                Paint::new("-d").fg(yansi::Color::Blue),
                Paint::new(format!("'{}'", escaped_json)).fg(yansi::Color::White)
            ));
        }
        log_output(format!("Request:\n{}", parts.join(" ")));
    }
}

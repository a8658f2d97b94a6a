//! In-memory stand-in for the backend API, used by `ak-helper demo` and the
//! integration tests.

mod directory;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde_json::{json, Value};

pub use directory::{Directory, DirectoryUser, MoveError};

use crate::config::LOGIN_PATH;
use crate::models::Cohort;
use crate::utils::{is_truthy, value_to_string};

const INVITE_HOST: &str = "https://demo.example.test";
const DEFAULT_INVITE_DAYS: i64 = 7;

/// Request counters, read by tests.
#[derive(Debug, Default)]
pub struct MockCounters {
    pub listings: AtomicUsize,
    pub promotions: AtomicUsize,
    pub demotions: AtomicUsize,
    pub invites: AtomicUsize,
    /// Promotions that asked for a notification mail.
    pub mail_requests: AtomicUsize,
}

impl MockCounters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct MockBackend {
    directory: Mutex<Directory>,
    pub counters: MockCounters,
    session_expired: AtomicBool,
    api_token: Option<String>,
}

impl MockBackend {
    pub fn new(directory: Directory) -> Self {
        MockBackend {
            directory: Mutex::new(directory),
            counters: MockCounters::default(),
            session_expired: AtomicBool::new(false),
            api_token: None,
        }
    }

    /// Only accept API calls carrying `Authorization: Bearer <token>`.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn seeded(count: usize, seed: u64) -> Self {
        MockBackend::new(Directory::seeded(count, seed))
    }

    /// While expired, API routes redirect to the login page like a backend
    /// whose session cookie has lapsed.
    pub fn set_session_expired(&self, expired: bool) {
        self.session_expired.store(expired, Ordering::SeqCst);
    }

    pub fn users(&self, cohort: Cohort) -> Vec<DirectoryUser> {
        self.with_directory(|dir| dir.users(cohort).to_vec())
    }

    fn with_directory<R>(&self, f: impl FnOnce(&mut Directory) -> R) -> R {
        let mut guard = self.directory.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

pub fn router(backend: Arc<MockBackend>) -> Router {
    let api = Router::new()
        .route("/guest-users", get(guest_users))
        .route("/members-users", get(member_users))
        .route("/promote", post(promote))
        .route("/demote", post(demote))
        .route("/invites", post(create_invite))
        .route_layer(middleware::from_fn_with_state(backend.clone(), require_session));

    Router::new()
        .route("/login", get(login_page))
        .route("/healthz", get(|| async { Json(json!({ "ok": true })) }))
        .merge(api)
        .with_state(backend)
}

/// Bind and serve the mock until the listener fails.
pub async fn serve(backend: Arc<MockBackend>, listener: tokio::net::TcpListener) -> std::io::Result<()> {
    axum::serve(listener, router(backend)).await
}

async fn require_session(State(backend): State<Arc<MockBackend>>, request: Request, next: Next) -> Response {
    if backend.session_expired.load(Ordering::SeqCst) {
        tracing::debug!(path = %request.uri().path(), "mock session expired");
        return Redirect::to(LOGIN_PATH).into_response();
    }
    if let Some(expected) = &backend.api_token {
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected.as_str()) {
            tracing::debug!(path = %request.uri().path(), "mock rejected api token");
            return (StatusCode::UNAUTHORIZED, [(CONTENT_TYPE, "text/plain")], "invalid token").into_response();
        }
    }
    next.run(request).await
}

async fn login_page() -> Html<&'static str> {
    Html("<!DOCTYPE html><html><body><h1>Sign in</h1><p>mock login page</p></body></html>")
}

fn listing(backend: &MockBackend, cohort: Cohort) -> Json<Value> {
    backend.counters.listings.fetch_add(1, Ordering::SeqCst);
    let users = backend.users(cohort);
    Json(json!({ "group_name": cohort.default_title(), "users": users }))
}

async fn guest_users(State(backend): State<Arc<MockBackend>>) -> Json<Value> {
    listing(&backend, Cohort::Guest)
}

async fn member_users(State(backend): State<Arc<MockBackend>>) -> Json<Value> {
    listing(&backend, Cohort::Member)
}

fn payload_pk(payload: &Value) -> Result<u64, Response> {
    match payload.get("pk") {
        None | Some(Value::Null) => Err(detail(StatusCode::BAD_REQUEST, "pk is required")),
        Some(v) => value_to_string(v)
            .trim()
            .parse::<u64>()
            .map_err(|_| detail(StatusCode::BAD_REQUEST, "pk must be an integer")),
    }
}

fn switch(backend: &MockBackend, payload: &Value, from: Cohort, to: Cohort) -> Response {
    let pk = match payload_pk(payload) {
        Ok(pk) => pk,
        Err(resp) => return resp,
    };
    match backend.with_directory(|dir| dir.move_user(pk, from, to)) {
        Ok(()) => Json(json!({ "status": "ok", "add": 200, "remove": 200 })).into_response(),
        Err(MoveError::NotFound) => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn promote(State(backend): State<Arc<MockBackend>>, Json(payload): Json<Value>) -> Response {
    backend.counters.promotions.fetch_add(1, Ordering::SeqCst);
    if payload.get("send_mail").map(is_truthy).unwrap_or(true) {
        backend.counters.mail_requests.fetch_add(1, Ordering::SeqCst);
    }
    switch(&backend, &payload, Cohort::Guest, Cohort::Member)
}

async fn demote(State(backend): State<Arc<MockBackend>>, Json(payload): Json<Value>) -> Response {
    backend.counters.demotions.fetch_add(1, Ordering::SeqCst);
    switch(&backend, &payload, Cohort::Member, Cohort::Guest)
}

async fn create_invite(State(backend): State<Arc<MockBackend>>, Json(payload): Json<Value>) -> Response {
    backend.counters.invites.fetch_add(1, Ordering::SeqCst);

    let days = payload
        .get("expires_days")
        .and_then(Value::as_i64)
        .unwrap_or(DEFAULT_INVITE_DAYS);
    if days < 1 {
        return detail(StatusCode::BAD_REQUEST, "expires_days must be positive");
    }
    let flow = payload
        .get("flow")
        .map(value_to_string)
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "default".to_string());

    let mut token = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut token);
    let token = hex::encode(token);
    let expires = Utc::now() + Duration::days(days);

    Json(json!({
        "pk": token,
        "invite_url": format!("{}/if/flow/{}/?itoken={}", INVITE_HOST, flow.trim(), token),
        "expires": expires.to_rfc3339(),
        "expires_friendly": expires.format("%a, %b %d, %Y, %I:%M %p UTC").to_string(),
    }))
    .into_response()
}

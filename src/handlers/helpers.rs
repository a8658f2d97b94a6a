use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::models::{AppState, Cohort};
use crate::panel::PanelSession;

pub const SESSION_COOKIE: &str = "session_id";

pub fn render_template<T: askama::Template>(t: T) -> Response {
    match t.render() {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::error!(%e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

pub fn session_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn session_from_jar(state: &AppState, jar: &CookieJar) -> Option<PanelSession> {
    let sid = session_id_from_jar(jar)?;
    state.sessions.get(&sid)
}

pub fn session_cookie(sid: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, sid);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// The caller's session for a `/ui/*` post. Without one the browser is sent
/// to the panel, which starts a session.
pub fn require_session(state: &AppState, jar: &CookieJar) -> Result<PanelSession, Response> {
    session_from_jar(state, jar).ok_or_else(|| {
        tracing::debug!("ui event without a live session");
        Redirect::to("/").into_response()
    })
}

/// Finish a `/ui/*` post: follow a pending login navigation if the backend
/// session expired, otherwise go back to the panel.
pub fn after_event(state: &AppState, session: &PanelSession) -> Response {
    match session.take_redirect(&state.login_url) {
        Some(location) => {
            tracing::info!(%location, "redirecting browser to login");
            Redirect::to(&location).into_response()
        }
        None => Redirect::to("/").into_response(),
    }
}

pub fn cohort_from_path(kind: &str) -> Result<Cohort, Response> {
    Cohort::parse(kind).ok_or_else(|| {
        tracing::debug!(kind, "unknown cohort in path");
        (StatusCode::NOT_FOUND, format!("unknown cohort: {}", kind)).into_response()
    })
}

use axum::{
    extract::{Form, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::api::InviteForm;
use crate::models::{AppState, Cohort, Theme};
use crate::panel::{ChangeEvent, ClickEvent, PanelSession};
use crate::templates::PanelTemplate;
use crate::ui::PageView;
use crate::utils::parse_flag;

use super::helpers::{after_event, cohort_from_path, render_template, require_session, session_cookie, session_from_jar};

/// Speculative fetches (the offline shell precache) get the empty panel and
/// never touch a session.
fn is_prefetch(headers: &HeaderMap) -> bool {
    headers
        .get("sec-purpose")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("prefetch"))
        .unwrap_or(false)
}

pub async fn index(State(state): State<AppState>, jar: CookieJar, headers: HeaderMap) -> Response {
    if is_prefetch(&headers) {
        return render_template(PanelTemplate::new(&PageView::new(Theme::default()), None));
    }

    let existing = session_from_jar(&state, &jar);
    let (jar, session) = match existing {
        Some(session) => (jar, session),
        None => {
            // a new browser: this is its page open
            let (sid, session) = state.sessions.create();
            session.panel.initial_load().await;
            (jar.add(session_cookie(sid)), session)
        }
    };

    if let Some(location) = session.take_redirect(&state.login_url) {
        return (jar, Redirect::to(&location)).into_response();
    }
    let clipboard = session.panel.take_clipboard();
    let view = session.panel.snapshot();
    (jar, render_template(PanelTemplate::new(&view, clipboard))).into_response()
}

fn cohort_and_session(state: &AppState, jar: &CookieJar, kind: &str) -> Result<(Cohort, PanelSession), Response> {
    let cohort = cohort_from_path(kind)?;
    Ok((cohort, require_session(state, jar)?))
}

pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn reload(State(state): State<AppState>, jar: CookieJar) -> Response {
    let session = match require_session(&state, &jar) {
        Ok(s) => s,
        Err(r) => return r,
    };
    session.panel.reload().await;
    after_event(&state, &session)
}

#[derive(Deserialize, Debug, Default)]
pub struct FilterForm {
    #[serde(default)]
    pub value: String,
}

pub async fn filter(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(kind): Path<String>,
    Form(form): Form<FilterForm>,
) -> Response {
    let (cohort, session) = match cohort_and_session(&state, &jar, &kind) {
        Ok(found) => found,
        Err(r) => return r,
    };
    if !session.panel.filter_input(cohort, &form.value).await {
        tracing::trace!(cohort = cohort.slug(), "filter keystroke superseded");
    }
    after_event(&state, &session)
}

#[derive(Deserialize, Debug, Default)]
pub struct CheckedForm {
    pub checked: Option<String>,
}

pub async fn select_all(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(kind): Path<String>,
    Form(form): Form<CheckedForm>,
) -> Response {
    let (cohort, session) = match cohort_and_session(&state, &jar, &kind) {
        Ok(found) => found,
        Err(r) => return r,
    };
    session.panel.select_all(cohort, parse_flag(form.checked.as_deref(), false));
    after_event(&state, &session)
}

pub async fn click(State(state): State<AppState>, jar: CookieJar, Form(event): Form<ClickEvent>) -> Response {
    let session = match require_session(&state, &jar) {
        Ok(s) => s,
        Err(r) => return r,
    };
    session.panel.click(&event).await;
    after_event(&state, &session)
}

pub async fn change(State(state): State<AppState>, jar: CookieJar, Form(event): Form<ChangeEvent>) -> Response {
    let session = match require_session(&state, &jar) {
        Ok(s) => s,
        Err(r) => return r,
    };
    session.panel.change(&event);
    after_event(&state, &session)
}

#[derive(Deserialize, Debug, Default)]
pub struct InviteFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub single_use: Option<String>,
    #[serde(default)]
    pub expires_days: String,
    #[serde(default)]
    pub flow: String,
}

impl From<InviteFields> for InviteForm {
    fn from(f: InviteFields) -> Self {
        InviteForm {
            name: f.name,
            username: f.username,
            email: f.email,
            // unchecked boxes are simply absent from the form body
            single_use: parse_flag(f.single_use.as_deref(), false),
            expires_days: f.expires_days,
            flow: f.flow,
        }
    }
}

pub async fn invite(State(state): State<AppState>, jar: CookieJar, Form(fields): Form<InviteFields>) -> Response {
    let session = match require_session(&state, &jar) {
        Ok(s) => s,
        Err(r) => return r,
    };
    session.panel.submit_invite(fields.into()).await;
    after_event(&state, &session)
}

#[derive(Deserialize, Debug, Default)]
pub struct BulkForm {
    pub send_mail: Option<String>,
}

pub async fn bulk(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(kind): Path<String>,
    Form(form): Form<BulkForm>,
) -> Response {
    let (cohort, session) = match cohort_and_session(&state, &jar, &kind) {
        Ok(found) => found,
        Err(r) => return r,
    };
    session
        .panel
        .bulk_action(cohort, parse_flag(form.send_mail.as_deref(), false))
        .await;
    after_event(&state, &session)
}

pub async fn theme(State(state): State<AppState>, jar: CookieJar) -> Response {
    let session = match require_session(&state, &jar) {
        Ok(s) => s,
        Err(r) => return r,
    };
    let theme = session.panel.toggle_theme();
    tracing::debug!(theme = theme.as_str(), "theme toggled");
    after_event(&state, &session)
}

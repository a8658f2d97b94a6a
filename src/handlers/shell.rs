//! Shell assets embedded in the binary. The stylesheet can be swapped at
//! startup with `serve --stylesheet`.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

use crate::models::AppState;

pub const DEFAULT_STYLESHEET: &str = include_str!("../../static/app.css");
const APP_JS: &str = include_str!("../../static/app.js");
const MANIFEST: &str = include_str!("../../static/manifest.webmanifest");
const ICON_192: &str = include_str!("../../static/icon-192.svg");
const ICON_512: &str = include_str!("../../static/icon-512.svg");

pub async fn stylesheet(State(state): State<AppState>) -> impl IntoResponse {
    let css = state
        .custom_css
        .clone()
        .unwrap_or_else(|| DEFAULT_STYLESHEET.to_string());
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], css)
}

pub async fn script() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/javascript; charset=utf-8")], APP_JS)
}

pub async fn manifest() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/manifest+json")], MANIFEST)
}

pub async fn icon_192() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/svg+xml")], ICON_192)
}

pub async fn icon_512() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/svg+xml")], ICON_512)
}

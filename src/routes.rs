use std::sync::Arc;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{panel, shell};
use crate::models::AppState;
use crate::offline::{offline_middleware, CacheStorage, OfflineWorker, RouterUpstream};

pub type ShellWorker = OfflineWorker<RouterUpstream>;

/// Panel routes and shell assets, without the offline worker in front.
pub fn build_router(state: AppState) -> Router {
    let assets = Router::new()
        .route("/manifest.webmanifest", get(shell::manifest))
        .route("/static/app.css", get(shell::stylesheet))
        .route("/static/app.js", get(shell::script))
        .route("/static/icon-192.svg", get(shell::icon_192))
        .route("/static/icon-512.svg", get(shell::icon_512))
        .layer(
            ServiceBuilder::new().layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=3600"),
            )),
        );

    Router::new()
        .route("/", get(panel::index))
        .route("/healthz", get(panel::healthz))
        .route("/ui/reload", post(panel::reload))
        .route("/ui/filter/:kind", post(panel::filter))
        .route("/ui/select-all/:kind", post(panel::select_all))
        .route("/ui/click", post(panel::click))
        .route("/ui/change", post(panel::change))
        .route("/ui/invite", post(panel::invite))
        .route("/ui/bulk/:kind", post(panel::bulk))
        .route("/ui/theme", post(panel::theme))
        .merge(assets)
        .with_state(state)
}

/// The full application: the offline worker wraps the panel router and uses a
/// clone of it as its network.
pub fn build_app(state: AppState) -> (Router, Arc<ShellWorker>) {
    let inner = build_router(state);
    let worker = Arc::new(OfflineWorker::new(
        RouterUpstream::new(inner.clone()),
        Arc::new(CacheStorage::new()),
    ));
    let app = inner
        .layer(middleware::from_fn_with_state(worker.clone(), offline_middleware))
        .layer(TraceLayer::new_for_http());
    (app, worker)
}

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Router;
use futures_util::future::{BoxFuture, FutureExt};
use tower::ServiceExt;

use super::{FetchRequest, OfflineError, OfflineWorker, ShellResponse, Strategy, Upstream, UpstreamError};

/// Largest body the worker will buffer into its cache.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Upstream backed by the panel's own router, called in-process. Its requests
/// carry no cookies and are marked as prefetches, so they never read or
/// consume a browser session.
#[derive(Clone)]
pub struct RouterUpstream {
    router: Router,
}

impl RouterUpstream {
    pub fn new(router: Router) -> Self {
        RouterUpstream { router }
    }
}

impl Upstream for RouterUpstream {
    fn fetch(&self, path: &str) -> BoxFuture<'static, Result<ShellResponse, UpstreamError>> {
        let router = self.router.clone();
        let path = path.to_string();
        async move {
            let request = Request::builder()
                .method(Method::GET)
                .uri(&path)
                .header(ACCEPT, "text/html,*/*")
                .header("sec-purpose", "prefetch")
                .body(Body::empty())
                .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
            let response = match router.oneshot(request).await {
                Ok(r) => r,
                Err(never) => match never {},
            };
            ShellResponse::from_response(response).await
        }
        .boxed()
    }
}

impl ShellResponse {
    pub async fn from_response(response: Response) -> Result<Self, UpstreamError> {
        let (parts, body) = response.into_parts();
        let body = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
        let headers = parts
            .headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        Ok(ShellResponse {
            status: parts.status.as_u16(),
            headers,
            body: body.to_vec(),
        })
    }
}

impl IntoResponse for ShellResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let headers = response.headers_mut();
        // append keeps repeated headers such as set-cookie
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                headers.append(name, value);
            }
        }
        response
    }
}

impl IntoResponse for OfflineError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "offline worker could not answer");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            "offline and not cached",
        )
            .into_response()
    }
}

impl FetchRequest {
    /// Classify an incoming request the way a browser labels fetch events.
    pub fn from_http(method: &Method, path: &str, headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("");
        let mode = header("sec-fetch-mode");
        let navigate = if mode.is_empty() {
            header(ACCEPT.as_str()).contains("text/html")
        } else {
            mode.eq_ignore_ascii_case("navigate")
        };
        FetchRequest {
            method: method.as_str().to_string(),
            path: path.to_string(),
            same_origin: !header("sec-fetch-site").eq_ignore_ascii_case("cross-site"),
            navigate,
        }
    }
}

/// Middleware placing the worker in front of every route.
pub async fn offline_middleware(
    State(worker): State<Arc<OfflineWorker<RouterUpstream>>>,
    request: Request,
    next: Next,
) -> Response {
    let fetch = FetchRequest::from_http(request.method(), request.uri().path(), request.headers());
    match worker.strategy(&fetch) {
        Strategy::Passthrough => next.run(request).await,
        Strategy::NetworkOnly => {
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        }
        Strategy::NetworkFirst => {
            // the browser's own request, cookies and all, is the network
            let outcome = ShellResponse::from_response(next.run(request).await).await;
            match worker.settle_navigation(&fetch.path, outcome) {
                Ok(r) => r.into_response(),
                Err(e) => e.into_response(),
            }
        }
        Strategy::StaleWhileRevalidate => match worker.stale_while_revalidate(&fetch.path).await {
            Ok(r) => r.into_response(),
            Err(e) => e.into_response(),
        },
    }
}

//! Offline shell cache, modelled on a service worker.
//!
//! The worker moves through `install → activate` once and then intercepts
//! fetches. Dynamic routes always go to the network, navigations and the
//! panel page itself are network-first with the cached root page as
//! fallback, and every other asset is served stale-while-revalidate.

mod storage;
mod upstream;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::{try_join_all, BoxFuture};
use thiserror::Error;

pub use storage::CacheStorage;
pub use upstream::{offline_middleware, RouterUpstream};

/// Versioned cache name; bumping it evicts the previous shell on activation.
pub const CACHE_NAME: &str = "ak-helper-v8";

/// Assets fetched and stored at install time.
pub const PRECACHE: [&str; 6] = [
    "/",
    "/manifest.webmanifest",
    "/static/app.js",
    "/static/app.css",
    "/static/icon-192.svg",
    "/static/icon-512.svg",
];

const DYNAMIC_PATHS: [&str; 4] = ["/guest-users", "/members-users", "/promote", "/demote"];
const DYNAMIC_PREFIXES: [&str; 2] = ["/invites", "/ui/"];

/// A response as kept in the cache.
#[derive(Clone, Debug, PartialEq)]
pub struct ShellResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ShellResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("precache of {path} failed: {source}")]
    Precache { path: String, source: UpstreamError },
    #[error("precache of {path} returned status {status}")]
    PrecacheStatus { path: String, status: u16 },
    #[error("no network response and nothing cached for {0}")]
    NothingCached(String),
    #[error("background refresh task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The "network" behind the worker.
pub trait Upstream: Send + Sync + 'static {
    fn fetch(&self, path: &str) -> BoxFuture<'static, Result<ShellResponse, UpstreamError>>;
}

/// An intercepted request, reduced to what the policy needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: String,
    pub path: String,
    pub same_origin: bool,
    pub navigate: bool,
}

impl FetchRequest {
    pub fn get(path: &str) -> Self {
        FetchRequest {
            method: "GET".to_string(),
            path: path.to_string(),
            same_origin: true,
            navigate: false,
        }
    }

    pub fn navigation(path: &str) -> Self {
        FetchRequest {
            navigate: true,
            ..FetchRequest::get(path)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Not handled by the worker at all.
    Passthrough,
    /// Straight to the network, never cached.
    NetworkOnly,
    NetworkFirst,
    StaleWhileRevalidate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

pub fn is_dynamic_path(path: &str) -> bool {
    DYNAMIC_PATHS.contains(&path) || DYNAMIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

pub struct OfflineWorker<U> {
    cache_name: String,
    storage: Arc<CacheStorage>,
    upstream: Arc<U>,
    lifecycle: Mutex<Lifecycle>,
    skip_waiting: AtomicBool,
    claimed: AtomicBool,
}

impl<U: Upstream> OfflineWorker<U> {
    pub fn new(upstream: U, storage: Arc<CacheStorage>) -> Self {
        OfflineWorker {
            cache_name: CACHE_NAME.to_string(),
            storage,
            upstream: Arc::new(upstream),
            lifecycle: Mutex::new(Lifecycle::Parsed),
            skip_waiting: AtomicBool::new(false),
            claimed: AtomicBool::new(false),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_lifecycle(&self, next: Lifecycle) {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }

    /// Fetch every shell asset and store them together; if any fetch fails
    /// nothing is stored and the worker stays unactivated.
    pub async fn install(&self) -> Result<(), OfflineError> {
        self.set_lifecycle(Lifecycle::Installing);
        let fetched = try_join_all(PRECACHE.iter().map(|path| {
            let fut = self.upstream.fetch(path);
            async move {
                let resp = fut.await.map_err(|source| OfflineError::Precache {
                    path: path.to_string(),
                    source,
                })?;
                if !resp.is_success() {
                    return Err(OfflineError::PrecacheStatus {
                        path: path.to_string(),
                        status: resp.status,
                    });
                }
                Ok((path.to_string(), resp))
            }
        }))
        .await;

        let entries = match fetched {
            Ok(entries) => entries,
            Err(e) => {
                self.set_lifecycle(Lifecycle::Parsed);
                return Err(e);
            }
        };
        for (path, resp) in entries {
            self.storage.put(&self.cache_name, &path, resp);
        }
        self.skip_waiting.store(true, Ordering::SeqCst);
        self.set_lifecycle(Lifecycle::Installed);
        tracing::info!(cache = %self.cache_name, assets = PRECACHE.len(), "offline shell installed");
        Ok(())
    }

    /// Drop caches from earlier versions and start controlling requests.
    /// Returns how many stale caches were deleted.
    pub fn activate(&self) -> usize {
        self.set_lifecycle(Lifecycle::Activating);
        let stale: Vec<String> = self
            .storage
            .keys()
            .into_iter()
            .filter(|k| *k != self.cache_name)
            .collect();
        for name in &stale {
            self.storage.delete(name);
        }
        self.set_lifecycle(Lifecycle::Activated);
        self.claimed.store(true, Ordering::SeqCst);
        tracing::info!(cache = %self.cache_name, evicted = stale.len(), "offline shell activated");
        stale.len()
    }

    /// Install, then activate right away (the worker always skips waiting).
    pub async fn start(&self) -> Result<(), OfflineError> {
        self.install().await?;
        if self.skip_waiting.load(Ordering::SeqCst) {
            self.activate();
        }
        Ok(())
    }

    pub fn strategy(&self, req: &FetchRequest) -> Strategy {
        if !self.is_claimed() || !req.method.eq_ignore_ascii_case("GET") || !req.same_origin {
            return Strategy::Passthrough;
        }
        if is_dynamic_path(&req.path) {
            return Strategy::NetworkOnly;
        }
        // `/` is session state, never a static asset
        if req.navigate || req.path == "/" {
            return Strategy::NetworkFirst;
        }
        Strategy::StaleWhileRevalidate
    }

    /// Answer a navigation: network first, cached root page if the network
    /// errors or answers with a server error.
    pub async fn network_first(&self, path: &str) -> Result<ShellResponse, OfflineError> {
        let outcome = self.upstream.fetch(path).await;
        self.settle_navigation(path, outcome)
    }

    /// Apply the navigation fallback to a network outcome obtained elsewhere,
    /// such as the browser's own request forwarded to the router.
    pub fn settle_navigation(
        &self,
        path: &str,
        outcome: Result<ShellResponse, UpstreamError>,
    ) -> Result<ShellResponse, OfflineError> {
        match outcome {
            Ok(resp) if resp.status < 500 => Ok(resp),
            outcome => {
                tracing::warn!(path, ?outcome, "navigation failed, serving cached shell");
                match self.storage.match_in(&self.cache_name, "/") {
                    Some(cached) => Ok(cached),
                    None => match outcome {
                        Ok(resp) => Ok(resp),
                        Err(_) => Err(OfflineError::NothingCached(path.to_string())),
                    },
                }
            }
        }
    }

    /// Serve the cached copy if there is one while refreshing it in the
    /// background; otherwise wait for the network.
    pub async fn stale_while_revalidate(&self, path: &str) -> Result<ShellResponse, OfflineError> {
        let cached = self.storage.match_in(&self.cache_name, path);
        let refresh = tokio::spawn(revalidate(
            Arc::clone(&self.upstream),
            Arc::clone(&self.storage),
            self.cache_name.clone(),
            path.to_string(),
        ));
        if let Some(hit) = cached {
            tracing::trace!(path, "serving cached asset");
            return Ok(hit);
        }
        refresh
            .await?
            .ok_or_else(|| OfflineError::NothingCached(path.to_string()))
    }
}

async fn revalidate<U: Upstream>(
    upstream: Arc<U>,
    storage: Arc<CacheStorage>,
    cache_name: String,
    path: String,
) -> Option<ShellResponse> {
    match upstream.fetch(&path).await {
        Ok(resp) => {
            if resp.is_success() {
                storage.put(&cache_name, &path, resp.clone());
            }
            Some(resp)
        }
        Err(e) => {
            tracing::debug!(%path, error = %e, "asset refresh failed");
            None
        }
    }
}

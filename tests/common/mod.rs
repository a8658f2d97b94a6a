#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ak_helper::api::{build_http_client, set_silent, ApiClient, PendingNavigation};
use ak_helper::mock::{self, Directory, DirectoryUser, MockBackend};
use ak_helper::models::AppState;
use ak_helper::panel::{Panel, SessionStore};
use ak_helper::prefs::PreferenceStore;
use ak_helper::ui::Debouncer;
use axum::Router;

pub const TEST_DEBOUNCE: Duration = Duration::from_millis(30);

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub async fn spawn_mock(directory: Directory) -> (Arc<MockBackend>, String) {
    let backend = Arc::new(MockBackend::new(directory));
    let base_url = spawn(mock::router(backend.clone())).await;
    (backend, base_url)
}

/// Guests 1..=guests and members starting at 101.
pub fn directory(guests: u64, members: u64) -> Directory {
    Directory::new(
        (1..=guests).map(|pk| DirectoryUser::new(pk, &format!("guest{}", pk))).collect(),
        (101..101 + members)
            .map(|pk| DirectoryUser::new(pk, &format!("member{}", pk)))
            .collect(),
    )
}

pub fn api(base_url: &str, navigation: PendingNavigation) -> ApiClient {
    set_silent(true);
    ApiClient::new(build_http_client().unwrap(), base_url, "", Arc::new(navigation))
}

pub fn panel(base_url: &str, navigation: PendingNavigation, prefs: PreferenceStore) -> Panel {
    Panel::with_debouncers(
        api(base_url, navigation),
        prefs,
        Debouncer::new(TEST_DEBOUNCE),
        Debouncer::new(TEST_DEBOUNCE),
    )
}

pub fn state(base_url: &str) -> AppState {
    let base = base_url.to_string();
    AppState {
        sessions: Arc::new(SessionStore::new(move |nav| panel(&base, nav, PreferenceStore::unavailable()))),
        login_url: ak_helper::config::login_url(base_url),
        custom_css: None,
    }
}

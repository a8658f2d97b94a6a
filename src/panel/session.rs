use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rand::RngCore;

use super::Panel;
use crate::api::PendingNavigation;
use crate::config::LOGIN_PATH;

/// Sessions untouched for this long are dropped when a new one starts.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

pub fn random_session_id() -> String {
    let mut b = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut b);
    hex::encode(b)
}

/// One browser's panel plus the navigator its API client reports to.
#[derive(Clone)]
pub struct PanelSession {
    pub panel: Arc<Panel>,
    pub navigation: PendingNavigation,
}

impl PanelSession {
    /// Consume a pending login navigation, resolved against the backend.
    pub fn take_redirect(&self, login_url: &str) -> Option<String> {
        self.navigation.take().map(|location| {
            if location == LOGIN_PATH {
                login_url.to_string()
            } else {
                location
            }
        })
    }
}

struct Entry {
    session: PanelSession,
    last_seen: Instant,
}

type BuildPanel = dyn Fn(PendingNavigation) -> Panel + Send + Sync;

/// Panels keyed by session id, so selections, filters, clipboard offers and
/// login redirects never leak between browsers.
pub struct SessionStore {
    build: Box<BuildPanel>,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl SessionStore {
    /// `build` creates the panel for a new session around its own navigator.
    pub fn new(build: impl Fn(PendingNavigation) -> Panel + Send + Sync + 'static) -> Self {
        SessionStore {
            build: Box::new(build),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn get(&self, id: &str) -> Option<PanelSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Start a fresh session, evicting idle ones first.
    pub fn create(&self) -> (String, PanelSession) {
        let navigation = PendingNavigation::default();
        let session = PanelSession {
            panel: Arc::new((self.build)(navigation.clone())),
            navigation,
        };
        let id = random_session_id();

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, e| e.last_seen.elapsed() < idle_timeout);
        if sessions.len() < before {
            tracing::debug!(evicted = before - sessions.len(), "idle panel sessions dropped");
        }
        sessions.insert(
            id.clone(),
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::info!(sessions = sessions.len(), "panel session started");
        (id, session)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

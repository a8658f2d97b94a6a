use std::sync::Arc;

use crate::panel::SessionStore;

#[derive(Clone)]
pub struct AppState {
    /// One panel per browser session.
    pub sessions: Arc<SessionStore>,
    /// Absolute URL of the backend login page.
    pub login_url: String,
    pub custom_css: Option<String>,
}

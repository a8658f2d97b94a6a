//! The panel controller: owns the application state and the rendered page
//! model, and exposes one method per user-facing event.
//!
//! State and view sit behind a single mutex that is never held across an
//! `.await`, so every render is atomic with respect to other events.
//! In-flight requests are never cancelled or sequenced: when two loads of the
//! same cohort race, whichever resolves last wins.

mod dispatch;
mod events;
mod loader;
mod session;

use std::sync::{Mutex, PoisonError};

use crate::api::ApiClient;
use crate::models::{Cohort, PanelState};
use crate::prefs::PreferenceStore;
use crate::ui::{Debouncer, PageView, DEFAULT_PAGE_SIZE};

pub use dispatch::{ChangeEvent, ClickEvent, ClickTarget};
pub use session::{random_session_id, PanelSession, SessionStore, DEFAULT_IDLE_TIMEOUT};

/// State plus the page drawn from it.
pub struct Ui {
    pub state: PanelState,
    pub view: PageView,
}

pub struct Panel {
    api: ApiClient,
    prefs: PreferenceStore,
    ui: Mutex<Ui>,
    guest_filter: Debouncer,
    member_filter: Debouncer,
}

impl Panel {
    /// Create the controller with page sizes and theme restored from `prefs`.
    pub fn new(api: ApiClient, prefs: PreferenceStore) -> Self {
        Panel::with_debouncers(api, prefs, Debouncer::default(), Debouncer::default())
    }

    pub fn with_debouncers(api: ApiClient, prefs: PreferenceStore, guest: Debouncer, member: Debouncer) -> Self {
        let theme = prefs.load_theme().unwrap_or_default();
        let state = PanelState::new(
            prefs.load_size(Cohort::Guest.size_key(), DEFAULT_PAGE_SIZE),
            prefs.load_size(Cohort::Member.size_key(), DEFAULT_PAGE_SIZE),
            theme,
        );
        Panel {
            api,
            prefs,
            ui: Mutex::new(Ui { state, view: PageView::new(theme) }),
            guest_filter: guest,
            member_filter: member,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Run `f` with exclusive access to state and view.
    pub fn with_ui<R>(&self, f: impl FnOnce(&mut Ui) -> R) -> R {
        let mut guard = self.ui.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Copy of the current page for rendering.
    pub fn snapshot(&self) -> PageView {
        self.with_ui(|ui| ui.view.clone())
    }

    /// Copy of the current state, mostly for inspection in tests.
    pub fn state(&self) -> PanelState {
        self.with_ui(|ui| ui.state.clone())
    }

    /// Hand out the pending clipboard text exactly once.
    pub fn take_clipboard(&self) -> Option<String> {
        self.with_ui(|ui| ui.view.clipboard.take())
    }

    fn filter_debouncer(&self, cohort: Cohort) -> &Debouncer {
        match cohort {
            Cohort::Guest => &self.guest_filter,
            Cohort::Member => &self.member_filter,
        }
    }

    fn set_status(&self, cohort: Cohort, text: impl Into<String>) {
        let text = text.into();
        self.with_ui(|ui| ui.view.cohort_mut(cohort).status = text);
    }
}

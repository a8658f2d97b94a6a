use futures_util::future::join;

use super::Panel;
use crate::api::{list_cohort, ApiError};
use crate::models::Cohort;
use crate::ui::refresh_table;

impl Panel {
    /// Fetch one cohort and redraw its table. Returns the number of users.
    ///
    /// Errors propagate untouched; the status line keeps its loading text and
    /// callers decide what to show.
    pub async fn load_cohort(&self, cohort: Cohort) -> Result<usize, ApiError> {
        self.set_status(cohort, "loading…");

        let listing = list_cohort(&self.api, cohort).await?;
        let count = listing.users.len();
        let title = listing.title(cohort);

        self.with_ui(|ui| {
            ui.view.cohort_mut(cohort).title = title;
            ui.state.cohort_mut(cohort).replace_users(listing.users);
            refresh_table(&mut ui.state, &mut ui.view, cohort);
            ui.view.cohort_mut(cohort).status = if count > 0 {
                format!("loaded {} users.", count)
            } else {
                "no users found.".to_string()
            };
        });
        tracing::debug!(cohort = cohort.slug(), count, "cohort loaded");
        Ok(count)
    }

    /// Reload both cohorts concurrently. Both loads always run to the end so
    /// a failure in one cohort still lets the other redraw; the first failure
    /// is returned.
    pub async fn load_all(&self) -> Result<(), ApiError> {
        let (guest, member) = join(self.load_cohort(Cohort::Guest), self.load_cohort(Cohort::Member)).await;
        guest?;
        member?;
        Ok(())
    }

    /// Page-open load: both cohorts settle independently and a failure only
    /// marks its own cohort's status.
    pub async fn initial_load(&self) {
        let (guest, member) = join(self.load_cohort(Cohort::Guest), self.load_cohort(Cohort::Member)).await;
        for (cohort, result) in [(Cohort::Guest, guest), (Cohort::Member, member)] {
            if let Err(e) = result {
                if matches!(e, ApiError::AuthRedirect) {
                    continue;
                }
                tracing::warn!(cohort = cohort.slug(), error = %e, "initial load failed");
                self.set_status(cohort, format!("error: {}", e));
            }
        }
    }
}

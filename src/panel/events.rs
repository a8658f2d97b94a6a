use futures_util::future::join_all;

use super::dispatch::{ChangeEvent, ClickEvent, ClickTarget};
use super::Panel;
use crate::api::{create_invite, transition, ApiError, InviteForm};
use crate::models::{Action, Cohort, Theme};
use crate::ui::{refresh_table, render_invite_result, visible_rows, InviteResult};

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl Panel {
    /// Same as the page-open load; bound to the manual refresh button.
    pub async fn reload(&self) {
        self.initial_load().await;
    }

    /// A keystroke in a filter box. The value is stored at once; the redraw
    /// happens after the debounce delay, and only for the latest keystroke.
    /// Returns whether this call performed the redraw.
    pub async fn filter_input(&self, cohort: Cohort, value: &str) -> bool {
        let value = value.to_string();
        self.with_ui(|ui| {
            ui.state.cohort_mut(cohort).filter = value.clone();
            ui.view.cohort_mut(cohort).filter = value;
        });
        if !self.filter_debouncer(cohort).settle().await {
            return false;
        }
        self.with_ui(|ui| {
            ui.state.cohort_mut(cohort).set_page(1);
            refresh_table(&mut ui.state, &mut ui.view, cohort);
        });
        true
    }

    /// Header checkbox: add or remove every visible row, leaving rows on
    /// other pages untouched.
    pub fn select_all(&self, cohort: Cohort, checked: bool) {
        self.with_ui(|ui| {
            let cs = ui.state.cohort_mut(cohort);
            for user in visible_rows(cs) {
                cs.set_selected(&user.pk, checked);
            }
            refresh_table(&mut ui.state, &mut ui.view, cohort);
        });
    }

    pub fn go_to_page(&self, cohort: Cohort, page: usize) {
        self.with_ui(|ui| {
            ui.state.cohort_mut(cohort).set_page(page);
            refresh_table(&mut ui.state, &mut ui.view, cohort);
        });
    }

    /// Row checkbox. `None` flips the current membership.
    pub fn toggle_row(&self, cohort: Cohort, pk: &str, checked: Option<bool>) {
        self.with_ui(|ui| {
            let cs = ui.state.cohort_mut(cohort);
            let on = checked.unwrap_or_else(|| !cs.is_selected(pk));
            cs.set_selected(pk, on);
            refresh_table(&mut ui.state, &mut ui.view, cohort);
        });
    }

    /// Page-size selector: store, persist, go back to page 1.
    pub fn change(&self, event: &ChangeEvent) {
        let Some((cohort, size)) = event.target() else {
            tracing::debug!(?event, "ignoring change without a page-size target");
            return;
        };
        self.with_ui(|ui| {
            ui.state.cohort_mut(cohort).set_page_size(size);
            refresh_table(&mut ui.state, &mut ui.view, cohort);
        });
        self.prefs.save_size(cohort.size_key(), size);
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = self.with_ui(|ui| {
            ui.state.theme = ui.state.theme.toggled();
            ui.view.theme = ui.state.theme;
            ui.state.theme
        });
        self.prefs.save_theme(theme);
        theme
    }

    /// Invite form submission. Validation and API failures both end up in the
    /// result line with a `failed` status.
    pub async fn submit_invite(&self, form: InviteForm) {
        self.with_ui(|ui| {
            ui.view.invite.status = "creating…".to_string();
            ui.view.invite.result = InviteResult::Empty;
        });

        let outcome = match form.into_request() {
            Ok(request) => {
                tracing::info!(
                    name_set = !request.name.is_empty(),
                    email_set = !request.email.is_empty(),
                    has_flow = request.flow.is_some(),
                    "creating invitation"
                );
                create_invite(&self.api, &request).await.map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        };

        self.with_ui(|ui| match outcome {
            Ok(response) => {
                ui.view.invite.status = "invitation created ✓".to_string();
                render_invite_result(&mut ui.view, &response);
            }
            Err(message) => {
                tracing::warn!(%message, "invitation failed");
                ui.view.invite.status = "failed".to_string();
                ui.view.invite.result = InviteResult::Message(message);
            }
        });
    }

    /// Promote (guests) or demote (members) every selected user at once, then
    /// reload both cohorts. Every request is driven to completion even when a
    /// sibling fails; one failure anywhere reports a single error for the
    /// whole batch and nothing is rolled back.
    pub async fn bulk_action(&self, cohort: Cohort, send_mail: bool) {
        let action = cohort.action();
        let pks: Vec<String> = self.with_ui(|ui| ui.state.cohort(cohort).selected.iter().cloned().collect());
        if pks.is_empty() {
            return;
        }
        let n = pks.len();

        self.with_ui(|ui| {
            let view = ui.view.cohort_mut(cohort);
            view.bulk.disabled = true;
            view.status = format!("{} {}…", action.progress_verb(), n);
        });
        tracing::info!(action = action.as_str(), count = n, send_mail, "bulk transition requested");

        let result = async {
            join_all(pks.iter().map(|pk| transition(&self.api, action, pk, send_mail)))
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()?;
            self.with_ui(|ui| ui.state.cohort_mut(cohort).selected.clear());
            self.load_all().await?;
            Ok::<(), ApiError>(())
        }
        .await;

        let status = match result {
            Ok(()) => {
                tracing::info!(action = action.as_str(), count = n, "bulk transition finished");
                format!("{} {} user{}", action.past_verb(), n, plural(n))
            }
            Err(e) => {
                tracing::warn!(action = action.as_str(), count = n, error = %e, "bulk transition failed");
                format!("error: {}", e)
            }
        };

        self.with_ui(|ui| {
            ui.view.cohort_mut(cohort).status = status;
            ui.view.cohort_mut(cohort).bulk.disabled = false;
            for c in Cohort::ALL {
                refresh_table(&mut ui.state, &mut ui.view, c);
            }
        });
    }

    /// Delegated click handling for pager buttons, row checkboxes and single
    /// promote/demote buttons.
    pub async fn click(&self, event: &ClickEvent) {
        match event.target() {
            Some(ClickTarget::Pager { cohort, page }) => self.go_to_page(cohort, page),
            Some(ClickTarget::RowSelect { cohort, pk, checked }) => self.toggle_row(cohort, &pk, checked),
            Some(ClickTarget::Action { action, pk, send_mail }) => self.single_action(action, &pk, send_mail).await,
            None => tracing::debug!(?event, "click without a known target"),
        }
    }

    async fn single_action(&self, action: Action, pk: &str, send_mail: bool) {
        let table = action.source();
        self.with_ui(|ui| {
            if let Some(row) = ui.view.cohort_mut(table).row_mut(pk) {
                row.button.disabled = true;
                row.button.label = format!("{}…", action.progress_verb());
            }
        });

        let result = async {
            transition(&self.api, action, pk, send_mail).await?;
            self.with_ui(|ui| {
                if let Some(row) = ui.view.cohort_mut(table).row_mut(pk) {
                    row.button.label = action.done_label().to_string();
                }
            });
            self.load_all().await?;
            Ok::<(), ApiError>(())
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(action = action.as_str(), pk, "user transitioned");
                self.set_status(table, format!("{} 1 user", action.past_verb()));
            }
            Err(e) => {
                tracing::warn!(action = action.as_str(), pk, error = %e, "single transition failed");
                self.with_ui(|ui| {
                    let view = ui.view.cohort_mut(table);
                    view.status = format!("error: {}", e);
                    if let Some(row) = view.row_mut(pk) {
                        row.button.label = "Error".to_string();
                        row.button.disabled = false;
                    }
                });
            }
        }
    }
}

use serde::Deserialize;

use crate::models::{Action, Cohort};
use crate::utils::{parse_flag, parse_positive_int};

/// Attributes carried by a click on the panel: pager buttons carry
/// `kind` + `page`, row checkboxes `kind` + `select`, action buttons
/// `action` + `pk`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClickEvent {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub select: Option<String>,
    #[serde(default)]
    pub checked: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub pk: Option<String>,
    #[serde(default)]
    pub send_mail: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    Pager { cohort: Cohort, page: usize },
    /// `checked: None` toggles the current membership.
    RowSelect { cohort: Cohort, pk: String, checked: Option<bool> },
    Action { action: Action, pk: String, send_mail: bool },
}

impl ClickEvent {
    pub fn pager(cohort: Cohort, page: usize) -> Self {
        ClickEvent {
            kind: Some(cohort.slug().to_string()),
            page: Some(page.to_string()),
            ..Default::default()
        }
    }

    pub fn row_select(cohort: Cohort, pk: &str, checked: bool) -> Self {
        ClickEvent {
            kind: Some(cohort.slug().to_string()),
            select: Some(pk.to_string()),
            checked: Some(if checked { "on" } else { "off" }.to_string()),
            ..Default::default()
        }
    }

    pub fn action(action: Action, pk: &str, send_mail: bool) -> Self {
        ClickEvent {
            action: Some(action.as_str().to_string()),
            pk: Some(pk.to_string()),
            send_mail: send_mail.then(|| "on".to_string()),
            ..Default::default()
        }
    }

    /// Resolve what was clicked, in priority order: pager button, then row
    /// checkbox, then single promote/demote button.
    pub fn target(&self) -> Option<ClickTarget> {
        let cohort = self.kind.as_deref().and_then(Cohort::parse);

        if let (Some(cohort), Some(page)) = (cohort, self.page.as_deref().and_then(parse_positive_int)) {
            return Some(ClickTarget::Pager { cohort, page });
        }

        if let (Some(cohort), Some(pk)) = (cohort, self.select.as_deref()) {
            let checked = self.checked.as_deref().map(|v| parse_flag(Some(v), false));
            return Some(ClickTarget::RowSelect {
                cohort,
                pk: pk.to_string(),
                checked,
            });
        }

        if let (Some(action), Some(pk)) = (self.action.as_deref().and_then(Action::parse), self.pk.as_deref()) {
            return Some(ClickTarget::Action {
                action,
                pk: pk.to_string(),
                send_mail: parse_flag(self.send_mail.as_deref(), false),
            });
        }
        None
    }
}

/// A change on a page-size selector.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChangeEvent {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl ChangeEvent {
    pub fn page_size(cohort: Cohort, size: usize) -> Self {
        ChangeEvent {
            kind: Some(cohort.slug().to_string()),
            size: Some(size.to_string()),
        }
    }

    pub fn target(&self) -> Option<(Cohort, usize)> {
        let cohort = self.kind.as_deref().and_then(Cohort::parse)?;
        let size = self.size.as_deref().and_then(parse_positive_int)?;
        Some((cohort, size))
    }
}

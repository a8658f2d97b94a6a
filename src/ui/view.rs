//! Model of the rendered panel. Render functions write into these structs and
//! the askama templates turn them into HTML.

use crate::models::{Action, Cohort, Theme};

#[derive(Clone, Debug, PartialEq)]
pub struct ButtonState {
    pub label: String,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub pk: String,
    pub username: String,
    pub email: String,
    pub checked: bool,
    pub action: Action,
    pub button: ButtonState,
}

impl RowView {
    pub fn action_name(&self) -> &'static str {
        self.action.as_str()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SizeOption {
    pub value: usize,
    pub selected: bool,
}

/// first / previous / next / last control.
#[derive(Clone, Debug, PartialEq)]
pub struct NavButton {
    pub page: usize,
    pub disabled: bool,
    pub title: &'static str,
    pub glyph: &'static str,
}

/// A numbered page button or an ellipsis gap.
#[derive(Clone, Debug, PartialEq)]
pub struct PageLink {
    pub page: usize,
    pub active: bool,
    pub ellipsis: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PagerView {
    /// False when everything fits on one page; nothing is drawn then.
    pub visible: bool,
    pub sizes: Vec<SizeOption>,
    pub count_label: String,
    pub nav: Vec<NavButton>,
    /// Empty for the simple (≤ 2 pages) layout.
    pub numbers: Vec<PageLink>,
}

impl PagerView {
    pub fn has_numbers(&self) -> bool {
        !self.numbers.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderCheckbox {
    pub checked: bool,
    pub indeterminate: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BulkButton {
    pub disabled: bool,
    pub hidden: bool,
    pub count_label: String,
}

impl Default for BulkButton {
    fn default() -> Self {
        BulkButton {
            disabled: true,
            hidden: true,
            count_label: "0 selected".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CohortView {
    pub kind: Cohort,
    pub title: String,
    pub status: String,
    pub filter: String,
    pub rows: Vec<RowView>,
    pub pager: PagerView,
    pub select_all: HeaderCheckbox,
    pub bulk: BulkButton,
}

impl CohortView {
    pub fn new(kind: Cohort) -> Self {
        CohortView {
            kind,
            title: kind.default_title().to_string(),
            status: String::new(),
            filter: String::new(),
            rows: Vec::new(),
            pager: PagerView::default(),
            select_all: HeaderCheckbox::default(),
            bulk: BulkButton::default(),
        }
    }

    pub fn slug(&self) -> &'static str {
        self.kind.slug()
    }

    pub fn bulk_label(&self) -> &'static str {
        match self.kind.action() {
            Action::Promote => "Promote selected",
            Action::Demote => "Demote selected",
        }
    }

    pub fn offers_mail(&self) -> bool {
        self.kind.action() == Action::Promote
    }

    pub fn row_mut(&mut self, pk: &str) -> Option<&mut RowView> {
        self.rows.iter_mut().find(|r| r.pk == pk)
    }
}

/// Outcome shown under the invite form.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InviteResult {
    #[default]
    Empty,
    Link { url: String, expires: Option<String> },
    Identifier(String),
    Message(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InviteView {
    pub status: String,
    pub result: InviteResult,
}

impl InviteView {
    pub fn link(&self) -> &str {
        match &self.result {
            InviteResult::Link { url, .. } => url,
            _ => "",
        }
    }

    pub fn expires(&self) -> &str {
        match &self.result {
            InviteResult::Link { expires: Some(e), .. } => e,
            _ => "",
        }
    }

    /// Plain text for non-link results.
    pub fn text(&self) -> String {
        match &self.result {
            InviteResult::Empty | InviteResult::Link { .. } => String::new(),
            InviteResult::Identifier(pk) => format!("invite uuid: {}", pk),
            InviteResult::Message(m) => m.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageView {
    pub guest: CohortView,
    pub member: CohortView,
    pub invite: InviteView,
    /// Text the page should try to put on the clipboard.
    pub clipboard: Option<String>,
    pub theme: Theme,
}

impl PageView {
    pub fn new(theme: Theme) -> Self {
        PageView {
            guest: CohortView::new(Cohort::Guest),
            member: CohortView::new(Cohort::Member),
            invite: InviteView::default(),
            clipboard: None,
            theme,
        }
    }

    pub fn cohort(&self, cohort: Cohort) -> &CohortView {
        match cohort {
            Cohort::Guest => &self.guest,
            Cohort::Member => &self.member,
        }
    }

    pub fn cohort_mut(&mut self, cohort: Cohort) -> &mut CohortView {
        match cohort {
            Cohort::Guest => &mut self.guest,
            Cohort::Member => &mut self.member,
        }
    }
}

use serde::{Deserialize, Serialize};

/// One of the two managed user groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cohort {
    #[serde(rename = "guest", alias = "guests")]
    Guest,
    #[serde(rename = "members", alias = "member")]
    Member,
}

impl Cohort {
    pub const ALL: [Cohort; 2] = [Cohort::Guest, Cohort::Member];

    /// Value used in `data-kind` attributes and `/ui/*/:kind` routes.
    pub fn slug(self) -> &'static str {
        match self {
            Cohort::Guest => "guest",
            Cohort::Member => "members",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "guest" | "guests" => Some(Cohort::Guest),
            "member" | "members" => Some(Cohort::Member),
            _ => None,
        }
    }

    /// Backend listing route.
    pub fn endpoint(self) -> &'static str {
        match self {
            Cohort::Guest => "/guest-users",
            Cohort::Member => "/members-users",
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            Cohort::Guest => "Guests",
            Cohort::Member => "Members",
        }
    }

    /// The transition every record of this cohort offers.
    pub fn action(self) -> Action {
        match self {
            Cohort::Guest => Action::Promote,
            Cohort::Member => Action::Demote,
        }
    }

    /// Preference key holding the persisted page size.
    pub fn size_key(self) -> &'static str {
        match self {
            Cohort::Guest => "pager:guest:size",
            Cohort::Member => "pager:member:size",
        }
    }
}

/// Group transition offered on a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Promote,
    Demote,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Promote => "promote",
            Action::Demote => "demote",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "promote" => Some(Action::Promote),
            "demote" => Some(Action::Demote),
            _ => None,
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Action::Promote => "/promote",
            Action::Demote => "/demote",
        }
    }

    /// Cohort whose status line reports on this action.
    pub fn source(self) -> Cohort {
        match self {
            Action::Promote => Cohort::Guest,
            Action::Demote => Cohort::Member,
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Action::Promote => "Promote",
            Action::Demote => "Demote",
        }
    }

    pub fn progress_verb(self) -> &'static str {
        match self {
            Action::Promote => "promoting",
            Action::Demote => "demoting",
        }
    }

    pub fn past_verb(self) -> &'static str {
        match self {
            Action::Promote => "promoted",
            Action::Demote => "demoted",
        }
    }

    pub fn done_label(self) -> &'static str {
        match self {
            Action::Promote => "Promoted ✓",
            Action::Demote => "Demoted ✓",
        }
    }
}

use std::collections::{BTreeSet, HashSet};

use super::cohort::Cohort;
use super::theme::Theme;
use super::user_record::UserRecord;

/// Everything the panel knows about one cohort's table.
#[derive(Clone, Debug)]
pub struct CohortState {
    pub users: Vec<UserRecord>,
    pub selected: BTreeSet<String>,
    pub page: usize,
    pub page_size: usize,
    /// Current value of the cohort's filter input.
    pub filter: String,
}

impl CohortState {
    pub fn new(page_size: usize) -> Self {
        CohortState {
            users: Vec::new(),
            selected: BTreeSet::new(),
            page: 1,
            page_size: page_size.max(1),
            filter: String::new(),
        }
    }

    /// Replace the list with a fresh load: prunes selections of vanished
    /// users and goes back to the first page.
    pub fn replace_users(&mut self, users: Vec<UserRecord>) {
        self.users = users;
        self.prune_selection();
        self.page = 1;
    }

    pub fn prune_selection(&mut self) {
        let existing: HashSet<&str> = self.users.iter().map(|u| u.pk.as_str()).collect();
        self.selected.retain(|pk| existing.contains(pk.as_str()));
    }

    pub fn set_selected(&mut self, pk: &str, selected: bool) {
        if selected {
            self.selected.insert(pk.to_string());
        } else {
            self.selected.remove(pk);
        }
    }

    pub fn is_selected(&self, pk: &str) -> bool {
        self.selected.contains(pk)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.page = 1;
    }
}

/// Process-wide panel state, owned by the controller.
#[derive(Clone, Debug)]
pub struct PanelState {
    pub guest: CohortState,
    pub member: CohortState,
    pub theme: Theme,
}

impl PanelState {
    pub fn new(guest_page_size: usize, member_page_size: usize, theme: Theme) -> Self {
        PanelState {
            guest: CohortState::new(guest_page_size),
            member: CohortState::new(member_page_size),
            theme,
        }
    }

    pub fn cohort(&self, cohort: Cohort) -> &CohortState {
        match cohort {
            Cohort::Guest => &self.guest,
            Cohort::Member => &self.member,
        }
    }

    pub fn cohort_mut(&mut self, cohort: Cohort) -> &mut CohortState {
        match cohort {
            Cohort::Guest => &mut self.guest,
            Cohort::Member => &mut self.member,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;

    fn user(pk: &str) -> UserRecord {
        UserRecord::new(pk, format!("user{}", pk), format!("user{}@example.test", pk), Action::Promote)
    }

    #[test]
    fn replace_users_prunes_vanished_selection_and_resets_page() {
        let mut state = CohortState::new(25);
        state.replace_users(vec![user("1"), user("2"), user("3")]);
        state.set_selected("1", true);
        state.set_selected("3", true);
        state.set_page(4);

        state.replace_users(vec![user("1"), user("2")]);

        assert!(state.is_selected("1"));
        assert!(!state.is_selected("3"));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn page_size_is_never_zero() {
        let mut state = CohortState::new(0);
        assert_eq!(state.page_size, 1);
        state.set_page_size(0);
        assert_eq!(state.page_size, 1);
    }
}

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::models::Cohort;

const FIRST: [&str; 12] = [
    "ada", "alan", "grace", "linus", "margaret", "ken", "barbara", "dennis", "frances", "edsger", "radia", "john",
];
const LAST: [&str; 10] = [
    "lovelace", "turing", "hopper", "torvalds", "hamilton", "thompson", "liskov", "ritchie", "allen", "perlman",
];

/// Share of seeded users placed in the members group.
const MEMBER_RATIO: f64 = 0.30;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DirectoryUser {
    pub pk: u64,
    pub username: String,
    pub email: String,
}

impl DirectoryUser {
    pub fn new(pk: u64, username: &str) -> Self {
        DirectoryUser {
            pk,
            username: username.to_string(),
            email: format!("{}@example.test", username),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveError {
    NotFound,
}

/// Group membership of the fake backend: every user sits in exactly one of
/// the two groups.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    guests: Vec<DirectoryUser>,
    members: Vec<DirectoryUser>,
}

impl Directory {
    pub fn new(guests: Vec<DirectoryUser>, members: Vec<DirectoryUser>) -> Self {
        let mut dir = Directory { guests, members };
        dir.sort();
        dir
    }

    /// Deterministic directory of `count` users for a given seed.
    pub fn seeded(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut dir = Directory::default();
        for pk in 1..=count as u64 {
            let first = FIRST.choose(&mut rng).copied().unwrap_or("user");
            let last = LAST.choose(&mut rng).copied().unwrap_or("example");
            let user = DirectoryUser::new(pk, &format!("{}.{}{}", first, last, pk));
            if rng.gen_bool(MEMBER_RATIO) {
                dir.members.push(user);
            } else {
                dir.guests.push(user);
            }
        }
        dir
    }

    fn sort(&mut self) {
        self.guests.sort_by_key(|u| u.pk);
        self.members.sort_by_key(|u| u.pk);
    }

    pub fn users(&self, cohort: Cohort) -> &[DirectoryUser] {
        match cohort {
            Cohort::Guest => &self.guests,
            Cohort::Member => &self.members,
        }
    }

    fn group_mut(&mut self, cohort: Cohort) -> &mut Vec<DirectoryUser> {
        match cohort {
            Cohort::Guest => &mut self.guests,
            Cohort::Member => &mut self.members,
        }
    }

    pub fn contains(&self, pk: u64) -> bool {
        Cohort::ALL.iter().any(|c| self.users(*c).iter().any(|u| u.pk == pk))
    }

    /// Move `pk` into `to`. A user already there is left alone.
    pub fn move_user(&mut self, pk: u64, from: Cohort, to: Cohort) -> Result<(), MoveError> {
        if !self.contains(pk) {
            return Err(MoveError::NotFound);
        }
        let source = self.group_mut(from);
        if let Some(idx) = source.iter().position(|u| u.pk == pk) {
            let user = source.remove(idx);
            self.group_mut(to).push(user);
            self.sort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_is_deterministic_and_partitions_users() {
        let a = Directory::seeded(200, 7);
        let b = Directory::seeded(200, 7);
        assert_eq!(a.users(Cohort::Guest), b.users(Cohort::Guest));
        assert_eq!(a.users(Cohort::Guest).len() + a.users(Cohort::Member).len(), 200);
        assert!(!a.users(Cohort::Member).is_empty());
    }

    #[test]
    fn move_user_is_idempotent_and_reports_unknown_pk() {
        let mut dir = Directory::new(vec![DirectoryUser::new(1, "ada")], vec![]);
        dir.move_user(1, Cohort::Guest, Cohort::Member).unwrap();
        dir.move_user(1, Cohort::Guest, Cohort::Member).unwrap();
        assert!(dir.users(Cohort::Guest).is_empty());
        assert_eq!(dir.users(Cohort::Member).len(), 1);
        assert_eq!(dir.move_user(9, Cohort::Guest, Cohort::Member), Err(MoveError::NotFound));
    }
}

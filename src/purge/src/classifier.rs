use gitlab_api::{AccountState, User};

use crate::model::{DisabledAccountRecord, DisabledBatch};

/// Collect the accounts whose state is exactly `state`, in listing order
pub fn classify(users: &[User], state: &AccountState) -> DisabledBatch {
    let mut batch = DisabledBatch::new(state.clone());
    for user in users.iter().filter(|u| u.state == *state) {
        batch.insert(DisabledAccountRecord::from_user(user));
    }
    batch
}

/// One batch per distinct state, in the order the states are given
pub fn classify_all(users: &[User], states: &[AccountState]) -> Vec<DisabledBatch> {
    let mut batches: Vec<DisabledBatch> = Vec::with_capacity(states.len());
    for state in states {
        if batches.iter().any(|b| b.state() == state) {
            continue;
        }
        batches.push(classify(users, state));
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn user(id: u64, state: &str) -> User {
        User {
            id,
            name: format!("User {id}"),
            username: format!("user{id}"),
            email: Some(format!("user{id}@example.com")),
            state: AccountState::from(state),
        }
    }

    fn sample() -> Vec<User> {
        vec![
            user(1, "active"),
            user(2, "blocked"),
            user(3, "banned"),
            user(4, "blocked"),
            user(5, "deactivated"),
            user(6, "banned"),
            user(7, "ldap_blocked"),
        ]
    }

    #[test]
    fn test_exact_state_match() {
        let users = sample();

        let blocked = classify(&users, &AccountState::Blocked);
        let ids: Vec<u64> = blocked.accounts().map(|a| a.id()).collect();
        assert_eq!(ids, vec![2, 4]);

        // ldap_blocked is a different label, not a blocked account
        assert!(!blocked.contains(7));
    }

    #[test]
    fn test_batches_are_disjoint_and_complete() {
        let users = sample();
        let batches = classify_all(&users, &[AccountState::Blocked, AccountState::Banned]);
        assert_eq!(batches.len(), 2);

        let blocked: HashSet<u64> = batches[0].accounts().map(|a| a.id()).collect();
        let banned: HashSet<u64> = batches[1].accounts().map(|a| a.id()).collect();
        assert!(blocked.is_disjoint(&banned));

        let union: HashSet<u64> = blocked.union(&banned).copied().collect();
        let expected: HashSet<u64> = users
            .iter()
            .filter(|u| u.state.is_disabled())
            .map(|u| u.id)
            .collect();
        assert_eq!(union, expected);
    }

    #[test]
    fn test_record_copies_identity() {
        let users = vec![user(5, "blocked")];
        let batch = classify(&users, &AccountState::Blocked);

        let record = batch.get(5).unwrap();
        assert_eq!(record.name(), "User 5");
        assert_eq!(record.username(), "user5");
        assert_eq!(record.email(), Some("user5@example.com"));
        assert_eq!(record.state(), &AccountState::Blocked);
        assert!(record.groups().is_empty());
        assert!(record.projects().is_empty());
    }

    #[test]
    fn test_custom_state_label() {
        let users = sample();
        let batch = classify(&users, &AccountState::from("deactivated"));
        assert_eq!(batch.len(), 1);
        assert!(batch.contains(5));
    }

    #[test]
    fn test_repeated_state_yields_one_batch() {
        let users = sample();
        let batches = classify_all(
            &users,
            &[AccountState::Banned, AccountState::Blocked, AccountState::Banned],
        );
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].state(), &AccountState::Banned);
        assert_eq!(batches[1].state(), &AccountState::Blocked);
    }

    #[test]
    fn test_no_users() {
        assert!(classify(&[], &AccountState::Blocked).is_empty());
    }
}

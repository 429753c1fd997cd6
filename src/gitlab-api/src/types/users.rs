use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a GitLab account
///
/// Labels the API reports that are not modelled here are kept verbatim in
/// [`AccountState::Other`] so they still compare exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountState {
    Active,
    Blocked,
    Banned,
    Other(String),
}

impl AccountState {
    pub fn as_str(&self) -> &str {
        match self {
            AccountState::Active => "active",
            AccountState::Blocked => "blocked",
            AccountState::Banned => "banned",
            AccountState::Other(label) => label,
        }
    }

    /// Whether this account is disabled and must not hold memberships
    pub fn is_disabled(&self) -> bool {
        matches!(self, AccountState::Blocked | AccountState::Banned)
    }
}

impl From<String> for AccountState {
    fn from(label: String) -> Self {
        match label.as_str() {
            "active" => AccountState::Active,
            "blocked" => AccountState::Blocked,
            "banned" => AccountState::Banned,
            _ => AccountState::Other(label),
        }
    }
}

impl From<&str> for AccountState {
    fn from(label: &str) -> Self {
        AccountState::from(label.to_string())
    }
}

impl From<AccountState> for String {
    fn from(state: AccountState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account as returned by `GET /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric account identifier, unique and stable
    pub id: u64,
    /// Display name
    pub name: String,
    /// Unique login name
    pub username: String,
    /// Primary email; only visible to administrator tokens
    #[serde(default)]
    pub email: Option<String>,
    /// Lifecycle state label
    pub state: AccountState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize_admin_view() {
        let json = r#"{
            "id": 5,
            "name": "Jane Roe",
            "username": "jroe",
            "email": "jroe@example.com",
            "state": "blocked",
            "avatar_url": "https://gitlab.example.com/avatar.png"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.username, "jroe");
        assert_eq!(user.email.as_deref(), Some("jroe@example.com"));
        assert_eq!(user.state, AccountState::Blocked);
    }

    #[test]
    fn test_user_without_email() {
        let json = r#"{"id": 7, "name": "Sam", "username": "sam", "state": "active"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.email.is_none());
        assert_eq!(user.state, AccountState::Active);
    }

    #[test]
    fn test_unknown_state_preserved() {
        let state: AccountState = serde_json::from_str(r#""blocked_pending_approval""#).unwrap();
        assert_eq!(
            state,
            AccountState::Other("blocked_pending_approval".to_string())
        );
        assert!(!state.is_disabled());
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#""blocked_pending_approval""#
        );
    }

    #[test]
    fn test_disabled_states() {
        assert!(AccountState::Blocked.is_disabled());
        assert!(AccountState::Banned.is_disabled());
        assert!(!AccountState::Active.is_disabled());
        assert_eq!(AccountState::from("banned").to_string(), "banned");
    }
}

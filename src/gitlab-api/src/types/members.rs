use serde::{Deserialize, Serialize};

use crate::AccountState;

/// A direct member of a group or project (`GET /{groups,projects}/:id/members`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: Option<AccountState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_deserialize() {
        let json = r#"[{
            "id": 5,
            "username": "jroe",
            "name": "Jane Roe",
            "state": "blocked",
            "access_level": 30
        }]"#;
        let members: Vec<Member> = serde_json::from_str(json).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, 5);
        assert_eq!(members[0].state, Some(AccountState::Blocked));
    }
}

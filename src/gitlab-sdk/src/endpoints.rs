use gitlab_api::{ContainerKind, Group, Member, Project, User};

use crate::{GitLabClient, Paged, SdkError};

impl GitLabClient {
    // ── Listings ───────────────────────────────────────────────────

    /// List every account on the instance
    pub async fn list_users(&self) -> Paged<User> {
        self.fetch_all("/users").await
    }

    /// List every group visible to the token
    pub async fn list_groups(&self) -> Paged<Group> {
        self.fetch_all("/groups").await
    }

    /// List every project visible to the token
    pub async fn list_projects(&self) -> Paged<Project> {
        self.fetch_all("/projects").await
    }

    /// List the direct members of a group or project
    pub async fn list_members(&self, kind: ContainerKind, container_id: u64) -> Paged<Member> {
        self.fetch_all(&format!("/{}/{container_id}/members", kind.collection()))
            .await
    }

    // ── Membership removal ─────────────────────────────────────────

    /// Remove a user's direct membership from a group or project
    pub async fn remove_member(
        &self,
        kind: ContainerKind,
        container_id: u64,
        user_id: u64,
    ) -> Result<(), SdkError> {
        self.delete(&format!(
            "/{}/{container_id}/members/{user_id}",
            kind.collection()
        ))
        .await
    }
}

//! Membership removal
//!
//! Removals run one at a time, account by account in batch order, groups
//! before projects. A failed removal is reported and the run moves on; there
//! is no rollback.

use gitlab_api::{AccountState, ContainerKind};
use gitlab_sdk::GitLabClient;
use tracing::{info, warn};

use crate::model::{DisabledAccountRecord, DisabledBatch, MembershipRecord};

/// What happened to one planned removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeStatus {
    /// The server answered `204 No Content`
    Removed,
    /// Any other answer, or no answer at all
    Failed { status: Option<u16>, error: String },
    /// Dry run: the request was not sent
    Skipped,
}

#[derive(Debug, Clone)]
pub struct PurgeOutcome {
    pub account_id: u64,
    pub username: String,
    pub kind: ContainerKind,
    pub container: MembershipRecord,
    pub status: PurgeStatus,
}

#[derive(Debug, Clone)]
pub struct PurgeReport {
    pub state: AccountState,
    pub dry_run: bool,
    pub outcomes: Vec<PurgeOutcome>,
}

impl PurgeReport {
    pub fn removed(&self) -> usize {
        self.count(|s| matches!(s, PurgeStatus::Removed))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, PurgeStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, PurgeStatus::Skipped))
    }

    pub fn failures(&self) -> impl Iterator<Item = &PurgeOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, PurgeStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&PurgeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

/// Revoke every membership recorded in `batch`
///
/// Never fails: each removal's result is captured in the report.
pub async fn purge(client: &GitLabClient, batch: &DisabledBatch, dry_run: bool) -> PurgeReport {
    let mut report = PurgeReport {
        state: batch.state().clone(),
        dry_run,
        outcomes: Vec::new(),
    };

    info!(
        state = %batch.state(),
        accounts = batch.len(),
        groups = batch.membership_count(ContainerKind::Group),
        projects = batch.membership_count(ContainerKind::Project),
        dry_run,
        "Removing memberships of disabled accounts"
    );

    for account in batch.accounts() {
        for kind in [ContainerKind::Group, ContainerKind::Project] {
            for container in account.memberships(kind) {
                let status = remove(client, account, kind, container, dry_run).await;
                report.outcomes.push(PurgeOutcome {
                    account_id: account.id(),
                    username: account.username().to_string(),
                    kind,
                    container: container.clone(),
                    status,
                });
            }
        }
    }

    info!(
        state = %batch.state(),
        removed = report.removed(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Membership removal complete"
    );

    report
}

async fn remove(
    client: &GitLabClient,
    account: &DisabledAccountRecord,
    kind: ContainerKind,
    container: &MembershipRecord,
    dry_run: bool,
) -> PurgeStatus {
    let email = account.email().unwrap_or("-");

    if dry_run {
        info!(
            account_id = account.id(),
            name = %account.name(),
            username = %account.username(),
            email,
            %kind,
            container_id = container.container_id,
            container_name = %container.container_name,
            "Dry run: would remove member"
        );
        return PurgeStatus::Skipped;
    }

    match client
        .remove_member(kind, container.container_id, account.id())
        .await
    {
        Ok(()) => {
            info!(
                account_id = account.id(),
                name = %account.name(),
                username = %account.username(),
                email,
                %kind,
                container_id = container.container_id,
                container_name = %container.container_name,
                "Removed member"
            );
            PurgeStatus::Removed
        }
        Err(e) => {
            warn!(
                account_id = account.id(),
                name = %account.name(),
                username = %account.username(),
                email,
                %kind,
                container_id = container.container_id,
                container_name = %container.container_name,
                error = %e,
                "Failed to remove member"
            );
            PurgeStatus::Failed {
                status: e.status(),
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: PurgeStatus) -> PurgeOutcome {
        PurgeOutcome {
            account_id: 5,
            username: "jroe".to_string(),
            kind: ContainerKind::Group,
            container: MembershipRecord::new(10, "Platform"),
            status,
        }
    }

    #[test]
    fn test_report_counters() {
        let report = PurgeReport {
            state: AccountState::Blocked,
            dry_run: false,
            outcomes: vec![
                outcome(PurgeStatus::Removed),
                outcome(PurgeStatus::Failed {
                    status: Some(404),
                    error: "API error (404): 404 Not found".to_string(),
                }),
                outcome(PurgeStatus::Removed),
                outcome(PurgeStatus::Skipped),
            ],
        };

        assert_eq!(report.removed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failures().count(), 1);
    }
}

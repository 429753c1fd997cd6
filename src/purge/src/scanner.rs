//! Membership scanning
//!
//! Every container's member list is fetched concurrently. Scan tasks never
//! touch the batch: each one returns what it discovered, and the single loop
//! driving the tasks applies those discoveries one container at a time. The
//! set of tracked accounts does not change while scanning, so tasks match
//! members against a snapshot taken up front.

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};
use gitlab_api::{Container, ContainerKind};
use gitlab_sdk::GitLabClient;
use tracing::{debug, info, warn};

use crate::ListingGap;
use crate::model::{DisabledBatch, MembershipRecord};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Member listings in flight at once
    pub concurrency: usize,
    /// Record project participation of active accounts whose username
    /// matches a disabled account
    pub track_active_participation: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: 16,
            track_active_participation: true,
        }
    }
}

/// Outcome of scanning one kind of container for one batch
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub kind: ContainerKind,
    pub containers_scanned: usize,
    pub memberships_found: usize,
    pub active_participations: usize,
    /// Containers whose member listing ended on a failed page
    pub truncated: Vec<ListingGap>,
}

impl ScanReport {
    fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            containers_scanned: 0,
            memberships_found: 0,
            active_participations: 0,
            truncated: Vec::new(),
        }
    }
}

enum Discovery {
    Member(u64),
    ActiveParticipant(u64),
}

struct ContainerScan {
    container: MembershipRecord,
    discoveries: Vec<Discovery>,
    gap: Option<ListingGap>,
}

/// Identity snapshot of the accounts being looked for
struct Tracked {
    ids: HashSet<u64>,
    by_username: HashMap<String, u64>,
}

impl Tracked {
    fn of(batch: &DisabledBatch) -> Self {
        Self {
            ids: batch.accounts().map(|a| a.id()).collect(),
            by_username: batch
                .accounts()
                .map(|a| (a.username().to_string(), a.id()))
                .collect(),
        }
    }
}

/// Find which accounts of `batch` are direct members of `containers`
///
/// Resolves only after every container has been scanned.
pub async fn scan<C: Container>(
    client: &GitLabClient,
    batch: &mut DisabledBatch,
    containers: &[C],
    options: &ScanOptions,
) -> ScanReport {
    let kind = C::KIND;
    let mut report = ScanReport::new(kind);

    if batch.is_empty() || containers.is_empty() {
        debug!(
            state = %batch.state(),
            %kind,
            accounts = batch.len(),
            containers = containers.len(),
            "Nothing to scan"
        );
        return report;
    }

    let tracked = Tracked::of(batch);
    let track_active = options.track_active_participation && kind == ContainerKind::Project;

    info!(
        state = %batch.state(),
        %kind,
        accounts = batch.len(),
        containers = containers.len(),
        "Scanning memberships"
    );

    let mut scans = stream::iter(containers)
        .map(|container| scan_container(client, container, &tracked, track_active))
        .buffer_unordered(options.concurrency.max(1));

    while let Some(scan) = scans.next().await {
        report.containers_scanned += 1;
        if let Some(gap) = scan.gap {
            report.truncated.push(gap);
        }

        for discovery in scan.discoveries {
            match discovery {
                Discovery::Member(account_id) => {
                    if batch.record_membership(account_id, kind, scan.container.clone()) {
                        report.memberships_found += 1;
                    }
                }
                Discovery::ActiveParticipant(account_id) => {
                    if batch.record_active_participation(account_id, scan.container.clone()) {
                        report.active_participations += 1;
                    }
                }
            }
        }
    }

    info!(
        state = %batch.state(),
        %kind,
        containers = report.containers_scanned,
        memberships = report.memberships_found,
        truncated = report.truncated.len(),
        "Membership scan complete"
    );

    report
}

async fn scan_container<C: Container>(
    client: &GitLabClient,
    container: &C,
    tracked: &Tracked,
    track_active: bool,
) -> ContainerScan {
    let kind = C::KIND;
    let record = MembershipRecord::new(container.id(), container.name());
    let members = client.list_members(kind, container.id()).await;

    let mut discoveries = Vec::new();
    for member in &members.items {
        if tracked.ids.contains(&member.id) {
            debug!(
                account_id = member.id,
                username = %member.username,
                %kind,
                container_id = record.container_id,
                "Disabled account is a member"
            );
            discoveries.push(Discovery::Member(member.id));
        } else if track_active
            && let Some(&account_id) = tracked.by_username.get(&member.username)
        {
            debug!(
                member_id = member.id,
                account_id,
                username = %member.username,
                project_id = record.container_id,
                "Active account shares a username with a disabled account"
            );
            discoveries.push(Discovery::ActiveParticipant(account_id));
        }
    }

    let gap = members.failure().map(|(page, error)| {
        warn!(
            %kind,
            container_id = record.container_id,
            container_name = %record.container_name,
            page,
            error = %error,
            "Member listing truncated; memberships past this page are not purged in this run"
        );
        ListingGap {
            resource: format!(
                "{kind} '{}' ({}) members",
                record.container_name, record.container_id
            ),
            page,
            error: error.to_string(),
        }
    });

    ContainerScan {
        container: record,
        discoveries,
        gap,
    }
}

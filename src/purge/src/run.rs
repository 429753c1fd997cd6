use common::Configuration;
use gitlab_api::AccountState;
use gitlab_sdk::{GitLabClient, Paged};
use tracing::{info, warn};

use crate::report::{BatchReport, ListingGap, RunReport};
use crate::scanner::{ScanOptions, scan};
use crate::{PurgeError, classify_all, purge};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Disabled states, processed in this order
    pub states: Vec<AccountState>,
    pub scan: ScanOptions,
    pub dry_run: bool,
    pub strict_listing: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            states: vec![AccountState::Blocked, AccountState::Banned],
            scan: ScanOptions::default(),
            dry_run: false,
            strict_listing: false,
        }
    }
}

impl From<&Configuration> for RunOptions {
    fn from(config: &Configuration) -> Self {
        Self {
            states: config
                .purge
                .states
                .iter()
                .map(|s| AccountState::from(s.as_str()))
                .collect(),
            scan: ScanOptions {
                concurrency: config.scan.concurrency,
                track_active_participation: config.scan.track_active_participation,
            },
            dry_run: config.purge.dry_run,
            strict_listing: config.purge.strict_listing,
        }
    }
}

/// Run discovery and purge end to end
///
/// Every batch is fully scanned (groups, then projects) before the first
/// removal is sent. Only a strict listing check can make this fail; failed
/// API calls are recorded in the report instead.
pub async fn run(client: &GitLabClient, options: &RunOptions) -> Result<RunReport, PurgeError> {
    let mut report = RunReport::default();

    let users = listing(client.list_users().await, "users", &mut report);
    report.users_total = users.len();
    info!(count = users.len(), "Users found");

    let mut batches = classify_all(&users, &options.states);
    for batch in &batches {
        info!(state = %batch.state(), count = batch.len(), "Disabled accounts found");
    }

    let groups = listing(client.list_groups().await, "groups", &mut report);
    report.groups_total = groups.len();
    info!(count = groups.len(), "Groups found");

    let projects = listing(client.list_projects().await, "projects", &mut report);
    report.projects_total = projects.len();
    info!(count = projects.len(), "Projects found");

    if options.strict_listing
        && let Some(gap) = report.listing_gaps.first()
    {
        return Err(PurgeError::IncompleteListing(gap.clone()));
    }

    let mut scans = Vec::with_capacity(batches.len());
    for batch in &mut batches {
        let group_scan = scan(client, batch, &groups, &options.scan).await;
        let project_scan = scan(client, batch, &projects, &options.scan).await;
        scans.push((group_scan, project_scan));
    }

    for (batch, (group_scan, project_scan)) in batches.into_iter().zip(scans) {
        let purge_report = purge(client, &batch, options.dry_run).await;
        report.batches.push(BatchReport {
            batch,
            group_scan,
            project_scan,
            purge: purge_report,
        });
    }

    info!(
        removed = report.removed(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Run complete"
    );

    Ok(report)
}

fn listing<T>(paged: Paged<T>, resource: &str, report: &mut RunReport) -> Vec<T> {
    if let Some((page, error)) = paged.failure() {
        warn!(
            resource,
            page,
            error = %error,
            "Listing incomplete; continuing with the items fetched so far"
        );
        report.listing_gaps.push(ListingGap {
            resource: resource.to_string(),
            page,
            error: error.to_string(),
        });
    }
    paged.into_items()
}

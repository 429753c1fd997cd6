use std::fmt;

use crate::executor::{PurgeReport, PurgeStatus};
use crate::model::DisabledBatch;
use crate::scanner::ScanReport;

/// A listing that ended on a failed page instead of an empty one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingGap {
    /// Human-readable name of the listing, e.g. `users`
    pub resource: String,
    /// First page that could not be fetched
    pub page: u32,
    pub error: String,
}

impl fmt::Display for ListingGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} truncated at page {}: {}",
            self.resource, self.page, self.error
        )
    }
}

/// Everything done for one disabled state
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub batch: DisabledBatch,
    pub group_scan: ScanReport,
    pub project_scan: ScanReport,
    pub purge: PurgeReport,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub users_total: usize,
    pub groups_total: usize,
    pub projects_total: usize,
    /// Gaps in the user, group and project listings
    pub listing_gaps: Vec<ListingGap>,
    pub batches: Vec<BatchReport>,
}

impl RunReport {
    pub fn removed(&self) -> usize {
        self.batches.iter().map(|b| b.purge.removed()).sum()
    }

    pub fn failed(&self) -> usize {
        self.batches.iter().map(|b| b.purge.failed()).sum()
    }

    pub fn skipped(&self) -> usize {
        self.batches.iter().map(|b| b.purge.skipped()).sum()
    }

    /// Listing gaps of every kind, top-level and per container
    pub fn gaps(&self) -> impl Iterator<Item = &ListingGap> {
        self.listing_gaps.iter().chain(
            self.batches
                .iter()
                .flat_map(|b| b.group_scan.truncated.iter().chain(&b.project_scan.truncated)),
        )
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Users found: {}", self.users_total)?;
        writeln!(f, "Groups found: {}", self.groups_total)?;
        writeln!(f, "Projects found: {}", self.projects_total)?;

        for batch in &self.batches {
            let state = batch.batch.state();
            writeln!(f)?;
            writeln!(f, "{} accounts: {}", state, batch.batch.len())?;

            for account in batch.batch.accounts() {
                if account.groups().is_empty()
                    && account.projects().is_empty()
                    && account.active_projects().is_empty()
                {
                    continue;
                }
                writeln!(
                    f,
                    "  {} ({}, {}, id {}): {} groups, {} projects",
                    account.name(),
                    account.username(),
                    account.email().unwrap_or("no email"),
                    account.id(),
                    account.groups().len(),
                    account.projects().len(),
                )?;
                for project in account.active_projects() {
                    writeln!(
                        f,
                        "    active account with this username in project '{}' ({})",
                        project.container_name, project.container_id
                    )?;
                }
            }

            for outcome in &batch.purge.outcomes {
                let verdict = match &outcome.status {
                    PurgeStatus::Removed => "removed".to_string(),
                    PurgeStatus::Skipped => "would remove (dry run)".to_string(),
                    PurgeStatus::Failed { error, .. } => format!("FAILED: {error}"),
                };
                writeln!(
                    f,
                    "  {} from {} '{}' ({}): {}",
                    outcome.username,
                    outcome.kind,
                    outcome.container.container_name,
                    outcome.container.container_id,
                    verdict
                )?;
            }
        }

        let gaps: Vec<_> = self.gaps().collect();
        if !gaps.is_empty() {
            writeln!(f)?;
            writeln!(f, "Incomplete listings (memberships may have been missed):")?;
            for gap in gaps {
                writeln!(f, "  {gap}")?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "Memberships removed: {}, failed: {}, skipped: {}",
            self.removed(),
            self.failed(),
            self.skipped()
        )
    }
}

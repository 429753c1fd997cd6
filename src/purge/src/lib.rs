//! Membership purge for disabled GitLab accounts.
//!
//! A run lists every user, group and project, picks out the accounts in the
//! configured disabled states, scans every container's members for them and
//! finally removes each membership found.

pub mod classifier;
pub mod executor;
pub mod model;
mod report;
mod run;
pub mod scanner;

use common::Configuration;
use gitlab_sdk::{ClientOptions, GitLabClient, RetryPolicy, SdkError};

pub use classifier::{classify, classify_all};
pub use executor::{PurgeOutcome, PurgeReport, PurgeStatus, purge};
pub use model::{DisabledAccountRecord, DisabledBatch, MembershipRecord};
pub use report::{BatchReport, ListingGap, RunReport};
pub use run::{RunOptions, run};
pub use scanner::{ScanOptions, ScanReport, scan};

#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error("Failed to create GitLab client: {0}")]
    Client(#[from] SdkError),

    #[error("Aborting before any removal, listing is incomplete: {0}")]
    IncompleteListing(ListingGap),
}

/// Build the one client a run shares, from validated configuration
pub fn connect(config: &Configuration) -> Result<GitLabClient, PurgeError> {
    let options = ClientOptions {
        page_size: config.gitlab.page_size,
        request_timeout: config.http.request_timeout,
        retry: RetryPolicy {
            max_retries: config.http.max_retries,
            base_delay: config.http.retry_base_delay,
        },
    };
    Ok(GitLabClient::new(
        &config.gitlab.url,
        &config.gitlab.token,
        options,
    )?)
}

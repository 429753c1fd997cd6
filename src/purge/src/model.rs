//! Per-account membership ledger built by the scanner and read by the executor.

use gitlab_api::{AccountState, ContainerKind, User};
use indexmap::IndexMap;

/// A container an account belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipRecord {
    pub container_id: u64,
    pub container_name: String,
}

impl MembershipRecord {
    pub fn new(container_id: u64, container_name: impl Into<String>) -> Self {
        Self {
            container_id,
            container_name: container_name.into(),
        }
    }
}

/// A disabled account together with the memberships found for it
///
/// Identity fields are fixed at creation. Membership lists only grow, and
/// only through [`DisabledBatch`].
#[derive(Debug, Clone)]
pub struct DisabledAccountRecord {
    id: u64,
    name: String,
    username: String,
    email: Option<String>,
    state: AccountState,
    groups: Vec<MembershipRecord>,
    projects: Vec<MembershipRecord>,
    active_projects: Vec<MembershipRecord>,
}

impl DisabledAccountRecord {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            state: user.state.clone(),
            groups: Vec::new(),
            projects: Vec::new(),
            active_projects: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    /// Groups the account is a direct member of
    pub fn groups(&self) -> &[MembershipRecord] {
        &self.groups
    }

    /// Projects the account is a direct member of
    pub fn projects(&self) -> &[MembershipRecord] {
        &self.projects
    }

    /// Projects where an active account with the same username participates
    ///
    /// Diagnostic only; never used to decide a removal.
    pub fn active_projects(&self) -> &[MembershipRecord] {
        &self.active_projects
    }

    pub fn memberships(&self, kind: ContainerKind) -> &[MembershipRecord] {
        match kind {
            ContainerKind::Group => &self.groups,
            ContainerKind::Project => &self.projects,
        }
    }

    fn memberships_mut(&mut self, kind: ContainerKind) -> &mut Vec<MembershipRecord> {
        match kind {
            ContainerKind::Group => &mut self.groups,
            ContainerKind::Project => &mut self.projects,
        }
    }
}

/// All disabled accounts of one state, in user-listing order
#[derive(Debug, Clone)]
pub struct DisabledBatch {
    state: AccountState,
    accounts: IndexMap<u64, DisabledAccountRecord>,
}

impl DisabledBatch {
    pub fn new(state: AccountState) -> Self {
        Self {
            state,
            accounts: IndexMap::new(),
        }
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, account_id: u64) -> bool {
        self.accounts.contains_key(&account_id)
    }

    pub fn get(&self, account_id: u64) -> Option<&DisabledAccountRecord> {
        self.accounts.get(&account_id)
    }

    /// Accounts in insertion order
    pub fn accounts(&self) -> impl Iterator<Item = &DisabledAccountRecord> {
        self.accounts.values()
    }

    /// Total memberships of `kind` recorded across the batch
    pub fn membership_count(&self, kind: ContainerKind) -> usize {
        self.accounts.values().map(|a| a.memberships(kind).len()).sum()
    }

    /// Add an account; the first record for an id wins
    pub(crate) fn insert(&mut self, record: DisabledAccountRecord) {
        self.accounts.entry(record.id).or_insert(record);
    }

    /// Append a membership to a tracked account; returns false for unknown ids
    pub(crate) fn record_membership(
        &mut self,
        account_id: u64,
        kind: ContainerKind,
        membership: MembershipRecord,
    ) -> bool {
        match self.accounts.get_mut(&account_id) {
            Some(account) => {
                account.memberships_mut(kind).push(membership);
                true
            }
            None => false,
        }
    }

    pub(crate) fn record_active_participation(
        &mut self,
        account_id: u64,
        project: MembershipRecord,
    ) -> bool {
        match self.accounts.get_mut(&account_id) {
            Some(account) => {
                account.active_projects.push(project);
                true
            }
            None => false,
        }
    }
}

//! Wire types for the subset of the GitLab REST v4 API consumed by blockpurge.

mod types;

pub use types::containers::{Container, ContainerKind, Group, Project};
pub use types::error::ApiError;
pub use types::members::Member;
pub use types::users::{AccountState, User};

mod client;
mod endpoints;
mod error;
mod paging;
mod retry;

#[cfg(feature = "testing")]
pub mod testing;

pub use client::{ClientOptions, GitLabClient, TOKEN_HEADER};
pub use error::SdkError;
pub use paging::{PageEnd, Paged};
pub use retry::RetryPolicy;

// Re-export API types for convenience
pub use gitlab_api;

//! Test utilities for blockpurge.
//!
//! # Feature Flag
//!
//! This module is only available when the `testing` feature is enabled or during tests:
//!
//! ```toml
//! [dev-dependencies]
//! common = { path = "../common", features = ["testing"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testing::TestConfigBuilder;
//!
//! let config = TestConfigBuilder::for_instance(&server.url(), "secret")
//!     .dry_run()
//!     .build();
//! ```

mod config_builder;

pub use config_builder::TestConfigBuilder;

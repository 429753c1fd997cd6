//! Test configuration builder for pointing a run at a fake instance.

use std::time::Duration;

use crate::config::Configuration;

/// Builder for creating test configurations.
///
/// Starts from the defaults with retries disabled and a short request
/// timeout, so a failing fake answers quickly.
#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: Configuration,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let mut config = Configuration::default();
        config.http.max_retries = 0;
        config.http.retry_base_delay = Duration::from_millis(1);
        config.http.request_timeout = Duration::from_secs(5);
        Self { config }
    }

    /// Target the instance at `url` with `token`
    pub fn for_instance(url: &str, token: &str) -> Self {
        let mut builder = Self::new();
        builder.config.gitlab.url = url.to_string();
        builder.config.gitlab.token = token.to_string();
        builder
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.config.gitlab.page_size = page_size;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.scan.concurrency = concurrency;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.http.max_retries = max_retries;
        self
    }

    /// Replace the processed account states
    pub fn with_states(mut self, states: &[&str]) -> Self {
        self.config.purge.states = states.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.config.purge.dry_run = true;
        self
    }

    pub fn strict_listing(mut self) -> Self {
        self.config.purge.strict_listing = true;
        self
    }

    pub fn without_active_participation(mut self) -> Self {
        self.config.scan.track_active_participation = false;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Configuration {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder_disables_retries() {
        let config = TestConfigBuilder::new().build();
        assert_eq!(config.http.max_retries, 0);
        assert_eq!(config.purge.states, vec!["blocked", "banned"]);
    }

    #[test]
    fn test_for_instance_is_valid() {
        let config = TestConfigBuilder::for_instance("http://127.0.0.1:8080", "secret")
            .with_page_size(5)
            .with_concurrency(2)
            .build();

        assert!(config.validate().is_ok());
        assert_eq!(config.gitlab.page_size, 5);
        assert_eq!(config.scan.concurrency, 2);
    }

    #[test]
    fn test_flags() {
        let config = TestConfigBuilder::new()
            .with_states(&["banned"])
            .dry_run()
            .strict_listing()
            .without_active_participation()
            .build();

        assert_eq!(config.purge.states, vec!["banned"]);
        assert!(config.purge.dry_run);
        assert!(config.purge.strict_listing);
        assert!(!config.scan.track_active_participation);
    }
}

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// Configuration file read from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "blockpurge.toml";

/// Prefix for nested overrides, e.g. `BLOCKPURGE__PURGE__DRY_RUN=true`
pub const ENV_PREFIX: &str = "BLOCKPURGE__";

/// Environment variables carrying the instance location and credential
pub const URL_VAR: &str = "GITLAB_URL";
pub const TOKEN_VAR: &str = "GITLAB_TOKEN";

/// GitLab's upper bound for `per_page`
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("{what} is not configured: set the {var} environment variable")]
    Missing {
        what: &'static str,
        var: &'static str,
    },

    #[error("Invalid GitLab URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Location of and credential for the GitLab instance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitLabConfig {
    /// Instance URL without the `/api/v4` suffix
    pub url: String,
    /// Administrator access token sent as `PRIVATE-TOKEN`
    pub token: String,
    /// Items requested per page on every listing
    pub page_size: u32,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Deadline for a single request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Retries for transport errors, 429 and 5xx answers
    pub max_retries: u32,
    /// First backoff delay; doubled on every further retry
    #[serde(with = "humantime_serde")]
    pub retry_base_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Member listings fetched at the same time
    pub concurrency: usize,
    /// Record project participation of active accounts sharing a username
    /// with a disabled account
    pub track_active_participation: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            track_active_participation: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Account states whose memberships are revoked, processed in this order
    pub states: Vec<String>,
    /// Report planned removals without sending them
    pub dry_run: bool,
    /// Abort before any removal when the user, group or project listing is
    /// incomplete
    pub strict_listing: bool,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            states: vec!["blocked".to_string(), "banned".to_string()],
            dry_run: false,
            strict_listing: false,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    pub gitlab: GitLabConfig,
    pub http: HttpConfig,
    pub scan: ScanConfig,
    pub purge: PurgeConfig,
}

impl Configuration {
    /// Defaults, then `blockpurge.toml`, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Defaults, then the TOML file at `path` (if present), then the environment
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::figment(path).extract().map_err(Box::new)?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(path))
            .merge(Env::raw().only(&[URL_VAR, TOKEN_VAR]).split("_"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject configurations the run cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gitlab.url.trim().is_empty() {
            return Err(ConfigError::Missing {
                what: "GitLab URL",
                var: URL_VAR,
            });
        }
        if self.gitlab.token.trim().is_empty() {
            return Err(ConfigError::Missing {
                what: "GitLab access token",
                var: TOKEN_VAR,
            });
        }

        let url = url::Url::parse(&self.gitlab.url).map_err(|source| ConfigError::InvalidUrl {
            url: self.gitlab.url.clone(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "GitLab URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.gitlab.page_size) {
            return Err(ConfigError::Invalid(format!(
                "gitlab.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.scan.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "scan.concurrency must be at least 1".to_string(),
            ));
        }
        if self.purge.states.is_empty() {
            return Err(ConfigError::Invalid(
                "purge.states must name at least one account state".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();

        assert!(config.gitlab.url.is_empty());
        assert_eq!(config.gitlab.page_size, 100);
        assert_eq!(config.http.request_timeout, Duration::from_secs(30));
        assert_eq!(config.http.max_retries, 2);
        assert_eq!(config.scan.concurrency, 16);
        assert_eq!(config.purge.states, vec!["blocked", "banned"]);
        assert!(!config.purge.dry_run);
    }

    #[test]
    fn test_gitlab_env_vars() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("GITLAB_URL", "https://gitlab.example.com");
            jail.set_env("GITLAB_TOKEN", "glpat-abcdef");

            let config = Configuration::load().unwrap();
            assert_eq!(config.gitlab.url, "https://gitlab.example.com");
            assert_eq!(config.gitlab.token, "glpat-abcdef");
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_missing_url_is_reported() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("GITLAB_TOKEN", "glpat-abcdef");

            let config = Configuration::load().unwrap();
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Missing { var: "GITLAB_URL", .. }));
            Ok(())
        });
    }

    #[test]
    fn test_missing_token_is_reported() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("GITLAB_URL", "https://gitlab.example.com");

            let config = Configuration::load().unwrap();
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Missing { var: "GITLAB_TOKEN", .. }));
            Ok(())
        });
    }

    #[test]
    fn test_file_and_prefixed_overrides() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "blockpurge.toml",
                r#"
                [gitlab]
                url = "https://file.example.com"
                token = "from-file"
                page_size = 50

                [http]
                request_timeout = "5s"

                [purge]
                states = ["banned"]
                "#,
            )?;
            jail.set_env("GITLAB_URL", "https://env.example.com");
            jail.set_env("BLOCKPURGE__PURGE__DRY_RUN", "true");
            jail.set_env("BLOCKPURGE__SCAN__CONCURRENCY", "4");

            let config = Configuration::load().unwrap();
            assert_eq!(config.gitlab.url, "https://env.example.com");
            assert_eq!(config.gitlab.token, "from-file");
            assert_eq!(config.gitlab.page_size, 50);
            assert_eq!(config.http.request_timeout, Duration::from_secs(5));
            assert_eq!(config.purge.states, vec!["banned"]);
            assert!(config.purge.dry_run);
            assert_eq!(config.scan.concurrency, 4);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_config_path() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "custom.toml",
                r#"
                [gitlab]
                url = "https://custom.example.com"
                token = "t"
                "#,
            )?;

            let config = Configuration::load_from_path(Path::new("custom.toml")).unwrap();
            assert_eq!(config.gitlab.url, "https://custom.example.com");
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Configuration::default();
        config.gitlab.url = "not a url".to_string();
        config.gitlab.token = "t".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        config.gitlab.url = "ftp://gitlab.example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.gitlab.url = "https://gitlab.example.com".to_string();
        config.gitlab.page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.gitlab.page_size = 100;
        config.scan.concurrency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.scan.concurrency = 1;
        config.purge.states.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.purge.states.push("blocked".to_string());
        assert!(config.validate().is_ok());
    }
}

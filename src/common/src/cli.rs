use clap::Parser;
use std::path::PathBuf;

/// CLI arguments shared by every blockpurge entry point
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::{ConfigError, Configuration};
    use tracing_subscriber::EnvFilter;

    /// Log level implied by the flags, if any was given
    pub fn level_override(args: &CommonArgs) -> Option<&'static str> {
        if args.quiet {
            Some("warn")
        } else if args.verbose {
            Some("debug")
        } else {
            None
        }
    }

    /// Initialize logging: flags win over `RUST_LOG`, which wins over `info`
    pub fn init_logging(args: &CommonArgs) {
        let filter = match level_override(args) {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    /// Load and validate configuration, honouring an explicit `--config` path
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration, ConfigError> {
        let config = match config_path {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Configuration::load_from_path(path)?
            }
            None => Configuration::load()?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_override() {
        let mut args = CommonArgs::default();
        assert_eq!(utils::level_override(&args), None);

        args.verbose = true;
        assert_eq!(utils::level_override(&args), Some("debug"));

        args.quiet = true;
        assert_eq!(utils::level_override(&args), Some("warn"));
    }

    #[test]
    fn test_parse_flags() {
        let args = CommonArgs::parse_from(["blockpurge", "--config", "purge.toml", "-v"]);
        assert_eq!(args.config, Some(PathBuf::from("purge.toml")));
        assert!(args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_load_config_requires_credentials() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("GITLAB_URL", "https://gitlab.example.com");

            let err = utils::load_config(None).unwrap_err();
            assert!(err.to_string().contains("GITLAB_TOKEN"));
            Ok(())
        });
    }
}

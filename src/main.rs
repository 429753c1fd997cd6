use anyhow::{Context, Result};
use clap::Parser;
use common::cli::{CommonArgs, utils};
use purge::RunOptions;
use tracing::info;

/// Remove blocked and banned accounts from every GitLab group and project
#[derive(Parser, Debug)]
#[command(name = "blockpurge", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Report what would be removed without removing anything
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    async fn run(self) -> Result<()> {
        utils::init_logging(&self.common);

        let mut config = utils::load_config(self.common.config.as_ref())
            .context("Failed to load configuration")?;
        if self.dry_run {
            config.purge.dry_run = true;
        }

        info!(
            url = %config.gitlab.url,
            states = ?config.purge.states,
            dry_run = config.purge.dry_run,
            "Starting membership purge"
        );

        let client = purge::connect(&config)?;
        let report = purge::run(&client, &RunOptions::from(&config))
            .await
            .context("Membership purge aborted")?;

        println!("{report}");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["blockpurge", "--dry-run", "-q", "--config", "ops.toml"]);
        assert!(cli.dry_run);
        assert!(cli.common.quiet);
        assert_eq!(
            cli.common.config.as_deref(),
            Some(std::path::Path::new("ops.toml"))
        );
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["blockpurge"]);
        assert!(!cli.dry_run);
        assert!(!cli.common.verbose);
        assert!(cli.common.config.is_none());
    }
}

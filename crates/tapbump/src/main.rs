//! tapbump CLI Application
//!
//! Updates a Homebrew formula or cask to a new release and publishes the
//! change to its tap, as a direct commit or through a pull request. The
//! outcome is printed to stdout as JSON; logs go to stderr.

// The outcome is the program's output
#![allow(clippy::print_stdout)]

mod cli;
mod logging;

use clap::Parser;
use cli::Cli;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use tapbump_github::GitHubHost;
use tapbump_homebrew::{UpdateOutcome, Updater};
use tapbump_release::{Error, HttpContentHasher};

const USER_AGENT: &str = concat!("tapbump/", env!("CARGO_PKG_VERSION"));

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.tracing_config())?;
    run(&cli).await
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.into_config()?;
    let token = cli.token().ok_or_else(|| {
        Error::invalid_input_with_help(
            "GitHub token is not set or empty",
            "Pass --token or set GITHUB_TOKEN",
        )
    })?;
    let host = GitHubHost::new(&token)?;
    let hasher = HttpContentHasher::with_user_agent(USER_AGENT)?;

    tracing::debug!(tap = %config.tap, package = %config.package, "Starting update");
    let output = match Updater::new(config, &host, &hasher).run().await? {
        UpdateOutcome::Unchanged => json!({ "kind": "unchanged" }),
        UpdateOutcome::DryRun { package, message } => json!({
            "kind": "dry_run",
            "path": package.file_path(),
            "message": message,
            "content": package.content(),
        }),
        UpdateOutcome::Published(outcome) => serde_json::to_value(&outcome).into_diagnostic()?,
    };
    println!("{output}");
    Ok(())
}

//! Command-line interface definitions for the `deckhand` binary.
//!
//! This module centralises the clap parser structures so both the main
//! binary and the build script can reuse them when generating the manual
//! page.

use clap::Parser;

/// Top-level CLI for the `deckhand` binary.
#[derive(Debug, Parser)]
#[command(
    name = "deckhand",
    about = "Provision continuous deployment for a static site on GitHub Pages",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Ensure the repository, CI hook, and configuration files exist.
    #[command(
        name = "provision",
        about = "Ensure the repository, CI hook, and configuration files exist"
    )]
    Provision(ProvisionCommand),
    /// Print both hosts' status lines.
    #[command(name = "status", about = "Print the source and CI host status lines")]
    Status,
}

/// Arguments for the `deckhand provision` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ProvisionCommand {
    /// Repository to provision, as owner/name.
    #[arg(value_name = "REPO")]
    pub(crate) repo: String,
    /// Source-host token with repository scope.
    ///
    /// Deckhand never stores this token; it is passed through to the hosts
    /// and sealed into the committed CI manifest.
    #[arg(
        long,
        env = "DECKHAND_GITHUB_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub(crate) github_token: String,
    /// Abort the run after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) deadline_secs: Option<u64>,
}

//! Binary entry point for the deckhand CLI.

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use deckhand::ci::CiHost;
use deckhand::source::SourceHost;
use deckhand::{
    DeckhandConfig, GitHubHost, ProvisionRequest, Provisioner, RepoRef, TravisCi, provision,
};

mod cli;

use cli::{Cli, ProvisionCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("output error: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            let mut stderr = io::stderr();
            drop(writeln!(stderr, "deckhand: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli {
        Cli::Provision(command) => provision_site(command).await,
        Cli::Status => host_status().await,
    }
}

fn load_config() -> Result<DeckhandConfig, CliError> {
    let config =
        DeckhandConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    config
        .validate()
        .map_err(|err| CliError::Config(err.to_string()))?;
    Ok(config)
}

fn gateways(config: &DeckhandConfig) -> (GitHubHost, TravisCi) {
    (
        GitHubHost::new(&config.github_api_root, &config.github_status_url),
        TravisCi::new(&config.travis_api_root, &config.travis_status_url),
    )
}

fn emit(line: &str) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{line}").map_err(|err| CliError::Output(err.to_string()))
}

async fn provision_site(command: ProvisionCommand) -> Result<ExitCode, CliError> {
    let config = load_config()?;
    let (source, ci) = gateways(&config);

    let mut provisioner = Provisioner::new(source, ci, config.identity());
    if let Some(secs) = command.deadline_secs {
        provisioner = provisioner.with_deadline(Duration::from_secs(secs));
    }

    let request = ProvisionRequest {
        repo_full_name: command.repo.clone(),
        source_token: command.github_token,
    };
    // Parsed again here only to render homepage links; the provisioner does
    // its own validation before any network call.
    let repo = RepoRef::parse(&command.repo).ok();

    match provisioner.execute(&request).await {
        Ok(outcome) => {
            emit(&provision::render(outcome.user_message, repo.as_ref()))?;
            Ok(if outcome.overall_success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(err) => {
            tracing::error!(error = %err, "provisioning failed");
            emit(&provision::render(err.user_message(), repo.as_ref()))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn host_status() -> Result<ExitCode, CliError> {
    let config = load_config()?;
    let (source, ci) = gateways(&config);

    let github_line = source
        .status()
        .await
        .unwrap_or_else(|_| deckhand::STATUS_UNAVAILABLE.to_owned());
    let travis_line = ci
        .status()
        .await
        .unwrap_or_else(|_| deckhand::STATUS_UNAVAILABLE.to_owned());

    emit(&format!("GitHub: {github_line}"))?;
    emit(&format!("Travis CI: {travis_line}"))?;
    Ok(ExitCode::SUCCESS)
}

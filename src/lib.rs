//! Core library for the deckhand provisioning tool.
//!
//! Deckhand coordinates a source-code host (GitHub) and a CI host (Travis
//! CI) into one idempotent workflow: ensure a repository exists, make sure
//! the CI host knows about it (triggering an account sync when it does not),
//! enable the build hook, and commit the configuration files that build and
//! deploy a static site.

pub mod ci;
pub mod config;
pub mod github;
pub mod provision;
pub mod repo;
pub mod sealer;
pub mod source;
mod status;
pub mod sync;
pub mod travis;

pub use ci::{CiHost, ProjectId, SyncStatus};
pub use config::{ConfigError, DeckhandConfig};
pub use github::{GitHubHost, GitHubHostError};
pub use provision::{
    CommitOutcome, ProvisionError, ProvisionIdentity, ProvisionOutcome, ProvisionRequest,
    Provisioner, UserMessage,
};
pub use repo::{RepoRef, RepoRefError};
pub use sealer::{DeployEnv, SealError};
pub use source::{AccountKind, CommitAuthor, ContentHash, CreateOutcome, FileSpec, SourceHost};
pub use status::STATUS_UNAVAILABLE;
pub use sync::{SyncOutcome, SyncWaiter};
pub use travis::{TravisCi, TravisCiError};

//! Error taxonomy for the provisioning pipeline.

use thiserror::Error;

use super::outcome::UserMessage;
use crate::repo::RepoRefError;

/// Errors surfaced by the hard gates of a provisioning run.
///
/// Partial failure of the independent sub-goals (hook vs. files) is not an
/// error; it is reported through the returned outcome so callers can
/// pattern-match which sub-goal failed.
#[derive(Debug, Error)]
pub enum ProvisionError<SE, CE>
where
    SE: std::error::Error + 'static,
    CE: std::error::Error + 'static,
{
    /// Raised before any network call when the repository name is invalid.
    #[error("invalid repository name: {0}")]
    Validation(#[source] RepoRefError),
    /// Raised when the target repository is owned by an organization.
    #[error("creating repositories under an organization is unsupported")]
    UnsupportedTarget,
    /// Raised when the repository appeared between the existence check and
    /// the creation attempt. Fails closed; no retry.
    #[error("repository already existed when creation was attempted")]
    Conflict,
    /// Raised when the source host refused to create the repository.
    #[error("the source host refused to create the repository")]
    RepoCreationFailed,
    /// Raised when no usable CI account is linked to the source token.
    #[error("no CI account is linked to this token")]
    NoCiAccount,
    /// Raised when the project stayed unknown to the CI host after one
    /// sync-and-retry.
    #[error("repository not found on the CI host after one sync attempt")]
    ProjectNotFound,
    /// Raised when the sync could not be started or its status query failed.
    #[error("the CI host aborted the account sync")]
    SyncAborted,
    /// Raised when every sync poll still reported a running sync.
    #[error("the account sync did not finish in time")]
    SyncTimedOut,
    /// Raised when the caller's deadline expired before the run finished.
    #[error("provisioning did not finish before the deadline")]
    DeadlineExceeded,
    /// Transport-level failure talking to the source host.
    #[error("source host error: {0}")]
    Source(#[source] SE),
    /// Transport-level failure talking to the CI host.
    #[error("CI host error: {0}")]
    Ci(#[source] CE),
}

impl<SE, CE> ProvisionError<SE, CE>
where
    SE: std::error::Error + 'static,
    CE: std::error::Error + 'static,
{
    /// User-facing category for this error.
    ///
    /// The two sync failures merge into one category; they stay separate
    /// variants so telemetry can tell them apart.
    #[must_use]
    pub const fn user_message(&self) -> UserMessage {
        match self {
            Self::Validation(_) => UserMessage::InvalidRepository,
            Self::UnsupportedTarget => UserMessage::UnsupportedOwner,
            Self::Conflict | Self::RepoCreationFailed => UserMessage::RepoCreationFailed,
            Self::NoCiAccount => UserMessage::NoCiAccount,
            Self::ProjectNotFound => UserMessage::ProjectNotFound,
            Self::SyncAborted | Self::SyncTimedOut => UserMessage::SyncUnconfirmed,
            Self::DeadlineExceeded => UserMessage::DeadlineExceeded,
            Self::Source(_) | Self::Ci(_) => UserMessage::HostUnreachable,
        }
    }
}

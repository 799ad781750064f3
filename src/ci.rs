//! CI-host gateway abstraction for hooks, keys, and account sync.

use crate::repo::RepoRef;
use crate::source::HostFuture;

/// Numeric project identifier assigned by the CI host.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Account sync metadata reported by the CI host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncStatus {
    /// Whether a repository sync is currently running.
    pub is_syncing: bool,
    /// Timestamp of the last completed sync, absent when the account has
    /// never synced.
    pub synced_at: Option<String>,
}

/// Gateway to the CI host's REST API.
///
/// Implementations are value-type services with no mutable instance state;
/// every credential arrives as an explicit parameter.
pub trait CiHost {
    /// Transport-level error type returned by the gateway. Ordinary host-side
    /// rejections (4xx/5xx) surface as typed results, never as this error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Exchanges a source-host token for a CI-host token.
    ///
    /// `None` covers both "no linked account" and "exchange failed"; the two
    /// are indistinguishable to callers and treated identically.
    fn exchange_token<'a>(
        &'a self,
        source_token: &'a str,
    ) -> HostFuture<'a, Option<String>, Self::Error>;

    /// Exchanges the token and confirms the account has completed at least
    /// one sync (a non-null last-synced marker).
    ///
    /// Holding a CI token alone is not sufficient proof of a usable account,
    /// so this is deliberately a double round trip.
    fn linked_account<'a>(
        &'a self,
        source_token: &'a str,
    ) -> HostFuture<'a, Option<String>, Self::Error>;

    /// Resolves the numeric project id for the repository.
    ///
    /// A hook entry matching the `(owner, name)` pair exactly must exist
    /// among the token-holder's registered hooks before the id is queried;
    /// a project absent from the hook list is not yet known to the CI host.
    fn find_project_id<'a>(
        &'a self,
        repo: &'a RepoRef,
        ci_token: &'a str,
    ) -> HostFuture<'a, Option<ProjectId>, Self::Error>;

    /// Activates the build hook for the project. Idempotent; enabling an
    /// already-enabled hook is a no-op success.
    fn enable_hook<'a>(
        &'a self,
        id: ProjectId,
        ci_token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error>;

    /// Fetches the project's RSA public key as a normalized PEM string
    /// loadable by a standard public-key parser, or `None` when the host has
    /// no key for the project.
    fn public_key<'a>(
        &'a self,
        repo: &'a RepoRef,
    ) -> HostFuture<'a, Option<String>, Self::Error>;

    /// Starts the asynchronous repository resync and returns the host's
    /// immediate acknowledgement, not completion.
    fn trigger_sync<'a>(&'a self, ci_token: &'a str) -> HostFuture<'a, bool, Self::Error>;

    /// Queries the account's sync metadata. `None` signals a failed query
    /// (non-success status), which pollers treat as terminal.
    fn sync_status<'a>(
        &'a self,
        ci_token: &'a str,
    ) -> HostFuture<'a, Option<SyncStatus>, Self::Error>;

    /// Best-effort host status line. Never fails; degraded fetches resolve to
    /// a fixed fallback string and are never on the provisioning path.
    fn status(&self) -> HostFuture<'_, String, Self::Error>;
}

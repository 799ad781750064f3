//! Source-host gateway abstraction for repository readiness and file commits.

use std::future::Future;
use std::pin::Pin;

use crate::repo::RepoRef;

/// Future returned by gateway operations.
pub type HostFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Blob content hash reported by the source host for an existing path.
///
/// Carried back into the conditional write so the host treats the request as
/// an update of exactly the observed content rather than a conflicting
/// create.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wraps a raw hash string as reported by the host.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw hash string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for ContentHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Author and committer identity attached to configuration commits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitAuthor {
    /// Display name recorded on the commit.
    pub name: String,
    /// Email address recorded on the commit.
    pub email: String,
}

/// One configuration file to be committed to the target repository.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileSpec {
    /// Path of the file relative to the repository root.
    pub path: String,
    /// Raw file contents, committed verbatim.
    pub content: Vec<u8>,
    /// Commit message for the write.
    pub message: String,
    /// Identity recorded as author and committer.
    pub author: CommitAuthor,
    /// Branch to commit to; the host's default branch when absent.
    pub branch: Option<String>,
}

/// Account classification reported by the source host.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccountKind {
    /// An individual user account.
    User,
    /// An organization account.
    Organization,
}

/// Typed result of a repository creation attempt.
///
/// Expected business outcomes are values rather than errors so callers can
/// pattern-match instead of catching.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CreateOutcome {
    /// The host confirmed the repository was created.
    Created,
    /// The repository already existed; nothing was attempted.
    AlreadyExists,
    /// The owner is an organization; creation is unsupported and was not
    /// attempted.
    UnsupportedOwner,
    /// The host rejected the creation request.
    Refused,
}

/// Gateway to the source-code host's REST API.
///
/// Implementations are value-type services with no mutable instance state;
/// every credential arrives as an explicit parameter.
pub trait SourceHost {
    /// Transport-level error type returned by the gateway. Ordinary host-side
    /// rejections (4xx/5xx) surface as typed results, never as this error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reports whether the repository exists on the host.
    fn repository_exists<'a>(
        &'a self,
        repo: &'a RepoRef,
        token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error>;

    /// Returns the content hash of `path` on the default branch when it
    /// exists, `None` otherwise.
    fn path_exists<'a>(
        &'a self,
        repo: &'a RepoRef,
        path: &'a str,
        token: &'a str,
    ) -> HostFuture<'a, Option<ContentHash>, Self::Error>;

    /// Performs a create-or-update write of one file.
    ///
    /// The write re-checks existence first and includes the observed hash as
    /// a precondition, so a path that changed in between fails closed rather
    /// than overwriting. A single attempt, never retried.
    fn commit_file<'a>(
        &'a self,
        repo: &'a RepoRef,
        spec: &'a FileSpec,
        token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error>;

    /// Creates the repository under a user account.
    ///
    /// Resolves the owner first; organization targets are refused before any
    /// creation request is issued. Idempotent: an existing repository yields
    /// [`CreateOutcome::AlreadyExists`] without a creation attempt.
    fn create_repository<'a>(
        &'a self,
        repo: &'a RepoRef,
        token: &'a str,
    ) -> HostFuture<'a, CreateOutcome, Self::Error>;

    /// Resolves whether the owner is a user or an organization.
    fn resolve_owner<'a>(
        &'a self,
        repo: &'a RepoRef,
        token: &'a str,
    ) -> HostFuture<'a, AccountKind, Self::Error>;

    /// Best-effort host status line. Never fails; degraded fetches resolve to
    /// a fixed fallback string and are never on the provisioning path.
    fn status(&self) -> HostFuture<'_, String, Self::Error>;
}

//! Terminal artifacts returned by a provisioning run.

/// Per-file result of the configuration commit step.
///
/// `committed = false` covers both "already exists, left untouched" and
/// "write failed"; the two are indistinguishable to callers by design.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitOutcome {
    /// Path of the file relative to the repository root.
    pub path: String,
    /// Whether the host confirmed a successful write.
    pub committed: bool,
}

/// User-facing category for a terminal provisioning state.
///
/// Every terminal state of a run, including the hard-gate errors, maps to
/// exactly one of these categories.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UserMessage {
    /// Hook enabled and both files committed.
    Done,
    /// Hook enabled but at least one file was not committed.
    OnlyHookEnabled,
    /// Files committed but the hook could not be enabled.
    OnlyFilesCommitted,
    /// Neither sub-goal succeeded.
    TotalFailure,
    /// The repository name failed validation.
    InvalidRepository,
    /// The target is owned by an organization.
    UnsupportedOwner,
    /// The source host would not create the repository.
    RepoCreationFailed,
    /// No usable CI account is linked to the token.
    NoCiAccount,
    /// The repository stayed unknown to the CI host after one sync attempt.
    ProjectNotFound,
    /// The account sync could not be confirmed (aborted or timed out).
    SyncUnconfirmed,
    /// The run was cancelled by the caller's deadline.
    DeadlineExceeded,
    /// A host could not be reached or answered with garbage.
    HostUnreachable,
}

/// Aggregated result of one provisioning run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProvisionOutcome {
    /// Whether the CI build hook ended up enabled.
    pub hook_enabled: bool,
    /// Per-file commit results, one entry per configuration file.
    pub commits: Vec<CommitOutcome>,
    /// True iff the hook is enabled and every commit succeeded.
    pub overall_success: bool,
    /// Category the caller should render guidance for.
    pub user_message: UserMessage,
}

impl ProvisionOutcome {
    /// Aggregates the two independent sub-goals into one outcome.
    #[must_use]
    pub fn new(hook_enabled: bool, commits: Vec<CommitOutcome>) -> Self {
        let all_committed = commits.iter().all(|commit| commit.committed);
        let user_message = match (hook_enabled, all_committed) {
            (true, true) => UserMessage::Done,
            (true, false) => UserMessage::OnlyHookEnabled,
            (false, true) => UserMessage::OnlyFilesCommitted,
            (false, false) => UserMessage::TotalFailure,
        };
        Self {
            hook_enabled,
            commits,
            overall_success: hook_enabled && all_committed,
            user_message,
        }
    }

    /// Commit result for a path, when that path was part of the run.
    #[must_use]
    pub fn committed(&self, path: &str) -> Option<bool> {
        self.commits
            .iter()
            .find(|commit| commit.path == path)
            .map(|commit| commit.committed)
    }
}

//! Orchestrates end-to-end provisioning across the source and CI hosts.
//!
//! The pipeline runs hard gates in order (validation, repository readiness,
//! CI linkage, project resolution), then attempts the two independent
//! sub-goals (hook activation and configuration commits) unconditionally and
//! merges their results, so a partially successful run reports exactly which
//! sub-goal failed.

pub mod files;

mod error;
mod messages;
mod outcome;


use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::ci::{CiHost, ProjectId};
use crate::repo::RepoRef;
use crate::sealer::{self, DeployEnv};
use crate::source::{CommitAuthor, CreateOutcome, FileSpec, SourceHost};
use crate::sync::{SyncOutcome, SyncWaiter};

pub use error::ProvisionError;
pub use messages::render;
pub use outcome::{CommitOutcome, ProvisionOutcome, UserMessage};

/// Inputs for one provisioning run.
#[derive(Clone, Debug)]
pub struct ProvisionRequest {
    /// Repository full name, `owner/name`.
    pub repo_full_name: String,
    /// Source-host token with repository scope.
    pub source_token: String,
}

/// Per-run credentials.
///
/// The CI token is exchanged lazily during the linkage gate and cached only
/// for the duration of the run; nothing is persisted.
#[derive(Clone, Debug)]
struct Credentials {
    source_token: String,
    ci_token: Option<String>,
}

/// Identities stamped on commits and embedded in the sealed environment.
#[derive(Clone, Debug)]
pub struct ProvisionIdentity {
    /// Author and committer recorded on configuration commits.
    pub commit_author: CommitAuthor,
    /// Git author name the CI build uses for deploy commits.
    pub ci_git_name: String,
    /// Git author email the CI build uses for deploy commits.
    pub ci_git_email: String,
}

/// Drives the provisioning workflow over the two host gateways.
#[derive(Debug)]
pub struct Provisioner<S, C> {
    source: S,
    ci: C,
    identity: ProvisionIdentity,
    waiter: SyncWaiter,
    deadline: Option<Duration>,
}

impl<S, C> Provisioner<S, C>
where
    S: SourceHost,
    C: CiHost,
{
    /// Creates a provisioner with no deadline and the standard sync waiter.
    #[must_use]
    pub const fn new(source: S, ci: C, identity: ProvisionIdentity) -> Self {
        Self {
            source,
            ci,
            identity,
            waiter: SyncWaiter::new(),
            deadline: None,
        }
    }

    /// Bounds a whole run; expiry surfaces as
    /// [`ProvisionError::DeadlineExceeded`].
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Overrides the sync waiter.
    ///
    /// This is primarily used by tests to keep backoff scenarios fast.
    #[must_use]
    pub const fn with_waiter(mut self, waiter: SyncWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Runs the end-to-end workflow and returns the aggregated outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] when a hard gate fails, a host transport
    /// call fails, or the configured deadline expires. Partial failure of
    /// the hook/file sub-goals is reported through the outcome instead.
    pub async fn execute(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionOutcome, ProvisionError<S::Error, C::Error>> {
        match self.deadline {
            Some(limit) => timeout(limit, self.run(request))
                .await
                .map_err(|_| ProvisionError::DeadlineExceeded)?,
            None => self.run(request).await,
        }
    }

    async fn run(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionOutcome, ProvisionError<S::Error, C::Error>> {
        // Gate 1: validation, before any network call.
        let repo =
            RepoRef::parse(&request.repo_full_name).map_err(ProvisionError::Validation)?;
        let mut credentials = Credentials {
            source_token: request.source_token.clone(),
            ci_token: None,
        };

        // Gate 2: repository readiness on the source host.
        self.ensure_repository(&repo, &credentials.source_token).await?;

        // Gate 3: a usable CI account linked to this token.
        self.require_linked_account(&mut credentials).await?;
        let ci_token = credentials
            .ci_token
            .clone()
            .ok_or(ProvisionError::NoCiAccount)?;

        // Gate 4: the CI host knows the project, syncing at most once.
        let project = self.resolve_project(&repo, &ci_token).await?;

        // The two sub-goals are independent: the hook result is retained but
        // never short-circuits the file commits.
        let hook_enabled = self
            .ci
            .enable_hook(project, &ci_token)
            .await
            .map_err(ProvisionError::Ci)?;
        if !hook_enabled {
            warn!(repo = %repo, "hook activation failed, still attempting file commits");
        }

        let commits = self
            .commit_configuration(&repo, &credentials.source_token)
            .await?;

        let result = ProvisionOutcome::new(hook_enabled, commits);
        info!(
            repo = %repo,
            hook_enabled = result.hook_enabled,
            success = result.overall_success,
            "provisioning finished"
        );
        Ok(result)
    }

    /// Creates the repository when absent; an existing repository passes the
    /// gate untouched.
    async fn ensure_repository(
        &self,
        repo: &RepoRef,
        source_token: &str,
    ) -> Result<(), ProvisionError<S::Error, C::Error>> {
        if self
            .source
            .repository_exists(repo, source_token)
            .await
            .map_err(ProvisionError::Source)?
        {
            debug!(repo = %repo, "repository already exists, proceeding without modification");
            return Ok(());
        }
        match self
            .source
            .create_repository(repo, source_token)
            .await
            .map_err(ProvisionError::Source)?
        {
            CreateOutcome::Created => {
                info!(repo = %repo, "repository created");
                Ok(())
            }
            // The repository appeared between the existence check and the
            // creation attempt. Fails closed; the caller may simply retry.
            CreateOutcome::AlreadyExists => Err(ProvisionError::Conflict),
            CreateOutcome::UnsupportedOwner => Err(ProvisionError::UnsupportedTarget),
            CreateOutcome::Refused => Err(ProvisionError::RepoCreationFailed),
        }
    }

    /// Exchanges the source token and caches the CI token on the run's
    /// credentials; absence of a usable account fails the gate.
    async fn require_linked_account(
        &self,
        credentials: &mut Credentials,
    ) -> Result<(), ProvisionError<S::Error, C::Error>> {
        let linked = self
            .ci
            .linked_account(&credentials.source_token)
            .await
            .map_err(ProvisionError::Ci)?;
        match linked {
            Some(token) => {
                credentials.ci_token = Some(token);
                Ok(())
            }
            None => Err(ProvisionError::NoCiAccount),
        }
    }

    /// Resolves the project id, triggering one sync-and-retry when absent.
    ///
    /// Exactly one retry: a second sync attempt in the same run cannot
    /// plausibly change the outcome.
    async fn resolve_project(
        &self,
        repo: &RepoRef,
        ci_token: &str,
    ) -> Result<ProjectId, ProvisionError<S::Error, C::Error>> {
        if let Some(id) = self
            .ci
            .find_project_id(repo, ci_token)
            .await
            .map_err(ProvisionError::Ci)?
        {
            return Ok(id);
        }

        info!(repo = %repo, "project unknown to the CI host, triggering account sync");
        if !self
            .ci
            .trigger_sync(ci_token)
            .await
            .map_err(ProvisionError::Ci)?
        {
            return Err(ProvisionError::SyncAborted);
        }
        match self
            .waiter
            .wait(&self.ci, ci_token)
            .await
            .map_err(ProvisionError::Ci)?
        {
            SyncOutcome::Finished => {}
            SyncOutcome::Aborted => return Err(ProvisionError::SyncAborted),
            SyncOutcome::TimedOut => return Err(ProvisionError::SyncTimedOut),
        }

        self.ci
            .find_project_id(repo, ci_token)
            .await
            .map_err(ProvisionError::Ci)?
            .ok_or(ProvisionError::ProjectNotFound)
    }

    /// Builds and commits the two configuration files independently.
    async fn commit_configuration(
        &self,
        repo: &RepoRef,
        source_token: &str,
    ) -> Result<Vec<CommitOutcome>, ProvisionError<S::Error, C::Error>> {
        let script = files::script_spec(repo, &self.identity.commit_author);
        let manifest = self.build_manifest(repo, source_token).await?;

        let mut commits = Vec::with_capacity(2);
        commits.push(self.guarded_commit(repo, &script, source_token).await?);
        match manifest {
            Some(spec) => {
                commits.push(self.guarded_commit(repo, &spec, source_token).await?);
            }
            None => commits.push(CommitOutcome {
                path: files::MANIFEST_PATH.to_owned(),
                committed: false,
            }),
        }
        Ok(commits)
    }

    /// Builds the manifest spec, or `None` when no sealed value could be
    /// produced; the script commit is still attempted in that case.
    async fn build_manifest(
        &self,
        repo: &RepoRef,
        source_token: &str,
    ) -> Result<Option<FileSpec>, ProvisionError<S::Error, C::Error>> {
        let Some(pem) = self
            .ci
            .public_key(repo)
            .await
            .map_err(ProvisionError::Ci)?
        else {
            warn!(repo = %repo, "no project public key, manifest not committed");
            return Ok(None);
        };
        let env = DeployEnv {
            source_token: source_token.to_owned(),
            git_name: self.identity.ci_git_name.clone(),
            git_email: self.identity.ci_git_email.clone(),
        };
        match sealer::seal(&pem, &env.render()) {
            Ok(sealed) => Ok(Some(files::manifest_spec(
                repo,
                &self.identity.commit_author,
                &sealed,
            ))),
            Err(err) => {
                warn!(repo = %repo, error = %err, "sealing failed, manifest not committed");
                Ok(None)
            }
        }
    }

    /// Commits one file unless it already exists; existing files are left
    /// untouched and reported as not committed.
    async fn guarded_commit(
        &self,
        repo: &RepoRef,
        spec: &FileSpec,
        source_token: &str,
    ) -> Result<CommitOutcome, ProvisionError<S::Error, C::Error>> {
        let existing = self
            .source
            .path_exists(repo, &spec.path, source_token)
            .await
            .map_err(ProvisionError::Source)?;
        let committed = if existing.is_some() {
            debug!(path = %spec.path, "path already exists, leaving untouched");
            false
        } else {
            self.source
                .commit_file(repo, spec, source_token)
                .await
                .map_err(ProvisionError::Source)?
        };
        Ok(CommitOutcome {
            path: spec.path.clone(),
            committed,
        })
    }
}

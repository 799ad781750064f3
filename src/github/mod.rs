//! GitHub implementation of the source-host gateway.

mod error;
mod types;


use std::sync::LazyLock;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::repo::RepoRef;
use crate::source::{
    AccountKind, ContentHash, CreateOutcome, FileSpec, HostFuture, SourceHost,
};
use crate::status;
use types::{AccountResponse, CommitIdentity, CommitPayload, ContentsResponse, CreateRepoPayload};

pub use error::GitHubHostError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const ORGANIZATION_KIND: &str = "Organization";
const REPO_DESCRIPTION: &str = "Static site built with deckhand";

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent("deckhand")
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Gateway to the GitHub v3 REST API.
///
/// A value-type service holding only endpoint roots; tokens arrive as
/// explicit parameters on every call.
#[derive(Clone, Debug)]
pub struct GitHubHost {
    api_root: String,
    status_url: String,
}

impl GitHubHost {
    /// Constructs a gateway against the given API root and status page.
    #[must_use]
    pub fn new(api_root: impl Into<String>, status_url: impl Into<String>) -> Self {
        Self {
            api_root: api_root.into().trim_end_matches('/').to_owned(),
            status_url: status_url.into(),
        }
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}", self.api_root, repo.owner(), repo.name())
    }

    fn contents_url(&self, repo: &RepoRef, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_root,
            repo.owner(),
            repo.name(),
            path
        )
    }

    fn account_url(&self, owner: &str) -> String {
        format!("{}/users/{}", self.api_root, owner)
    }

    fn create_url(&self) -> String {
        format!("{}/user/repos", self.api_root)
    }

    fn auth_value(token: &str) -> String {
        format!("token {token}")
    }

    async fn probe_path(
        &self,
        repo: &RepoRef,
        path: &str,
        token: &str,
    ) -> Result<Option<ContentHash>, GitHubHostError> {
        let response = HTTP_CLIENT
            .get(self.contents_url(repo, path))
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(token))
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let contents: ContentsResponse =
            response
                .json()
                .await
                .map_err(|err| GitHubHostError::Decode {
                    operation: "path_exists",
                    message: err.to_string(),
                })?;
        Ok(Some(ContentHash::new(contents.sha)))
    }

    async fn write_file(
        &self,
        repo: &RepoRef,
        spec: &FileSpec,
        token: &str,
    ) -> Result<bool, GitHubHostError> {
        // Fresh existence check on every write; the observed hash becomes the
        // update precondition so a concurrent change fails closed.
        let existing = self.probe_path(repo, &spec.path, token).await?;
        let identity = CommitIdentity {
            name: &spec.author.name,
            email: &spec.author.email,
        };
        let payload = CommitPayload {
            path: &spec.path,
            message: &spec.message,
            content: BASE64.encode(&spec.content),
            sha: existing.as_ref().map(ContentHash::as_str),
            branch: spec.branch.as_deref(),
            author: identity,
            committer: identity,
        };
        let response = HTTP_CLIENT
            .put(self.contents_url(repo, &spec.path))
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(token))
            .json(&payload)
            .send()
            .await?;
        let committed = response.status().is_success();
        debug!(repo = %repo, path = %spec.path, committed, "content write finished");
        Ok(committed)
    }

    async fn create(
        &self,
        repo: &RepoRef,
        token: &str,
    ) -> Result<CreateOutcome, GitHubHostError> {
        if self.probe_repository(repo, token).await? {
            return Ok(CreateOutcome::AlreadyExists);
        }
        if self.probe_owner(repo, token).await? == AccountKind::Organization {
            return Ok(CreateOutcome::UnsupportedOwner);
        }
        let payload = CreateRepoPayload {
            name: repo.name(),
            description: REPO_DESCRIPTION,
            homepage: repo.homepage(),
            private: false,
            has_issues: false,
            has_wiki: false,
            has_downloads: false,
        };
        let response = HTTP_CLIENT
            .post(self.create_url())
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(token))
            .json(&payload)
            .send()
            .await?;
        if response.status() == StatusCode::CREATED {
            debug!(repo = %repo, "repository created");
            Ok(CreateOutcome::Created)
        } else {
            warn!(repo = %repo, status = %response.status(), "repository creation refused");
            Ok(CreateOutcome::Refused)
        }
    }

    async fn probe_repository(
        &self,
        repo: &RepoRef,
        token: &str,
    ) -> Result<bool, GitHubHostError> {
        let response = HTTP_CLIENT
            .get(self.repo_url(repo))
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(token))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    async fn probe_owner(
        &self,
        repo: &RepoRef,
        token: &str,
    ) -> Result<AccountKind, GitHubHostError> {
        let response = HTTP_CLIENT
            .get(self.account_url(repo.owner()))
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(token))
            .send()
            .await?;
        let code = response.status();
        if !code.is_success() {
            return Err(GitHubHostError::UnexpectedStatus {
                operation: "resolve_owner",
                status: code.as_u16(),
            });
        }
        let account: AccountResponse =
            response
                .json()
                .await
                .map_err(|err| GitHubHostError::Decode {
                    operation: "resolve_owner",
                    message: err.to_string(),
                })?;
        if account.kind == ORGANIZATION_KIND {
            Ok(AccountKind::Organization)
        } else {
            Ok(AccountKind::User)
        }
    }
}

impl SourceHost for GitHubHost {
    type Error = GitHubHostError;

    fn repository_exists<'a>(
        &'a self,
        repo: &'a RepoRef,
        token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move { self.probe_repository(repo, token).await })
    }

    fn path_exists<'a>(
        &'a self,
        repo: &'a RepoRef,
        path: &'a str,
        token: &'a str,
    ) -> HostFuture<'a, Option<ContentHash>, Self::Error> {
        Box::pin(async move { self.probe_path(repo, path, token).await })
    }

    fn commit_file<'a>(
        &'a self,
        repo: &'a RepoRef,
        spec: &'a FileSpec,
        token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move { self.write_file(repo, spec, token).await })
    }

    fn create_repository<'a>(
        &'a self,
        repo: &'a RepoRef,
        token: &'a str,
    ) -> HostFuture<'a, CreateOutcome, Self::Error> {
        Box::pin(async move { self.create(repo, token).await })
    }

    fn resolve_owner<'a>(
        &'a self,
        repo: &'a RepoRef,
        token: &'a str,
    ) -> HostFuture<'a, AccountKind, Self::Error> {
        Box::pin(async move { self.probe_owner(repo, token).await })
    }

    fn status(&self) -> HostFuture<'_, String, Self::Error> {
        Box::pin(async move { Ok(status::fetch_status(&HTTP_CLIENT, &self.status_url).await) })
    }
}

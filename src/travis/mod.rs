//! Travis CI implementation of the CI-host gateway.

mod error;
mod types;


use std::sync::LazyLock;
use std::time::Duration;

use tracing::{debug, warn};

use crate::ci::{CiHost, ProjectId, SyncStatus};
use crate::repo::RepoRef;
use crate::source::HostFuture;
use crate::status;
use types::{
    HookEntry, HookUpdate, HookUpdatePayload, RepoResponse, SyncTriggerResponse, TokenResponse,
    UserResponse,
};

pub use error::TravisCiError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent("deckhand")
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Gateway to the Travis CI API.
///
/// A value-type service holding only endpoint roots; tokens arrive as
/// explicit parameters on every call.
#[derive(Clone, Debug)]
pub struct TravisCi {
    api_root: String,
    status_url: String,
}

impl TravisCi {
    /// Constructs a gateway against the given API root and status page.
    #[must_use]
    pub fn new(api_root: impl Into<String>, status_url: impl Into<String>) -> Self {
        Self {
            api_root: api_root.into().trim_end_matches('/').to_owned(),
            status_url: status_url.into(),
        }
    }

    fn auth_url(&self) -> String {
        format!("{}/auth/github", self.api_root)
    }

    fn hooks_url(&self) -> String {
        format!("{}/hooks", self.api_root)
    }

    fn hook_url(&self, id: ProjectId) -> String {
        format!("{}/hooks/{}", self.api_root, id.value())
    }

    fn project_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}", self.api_root, repo.owner(), repo.name())
    }

    fn sync_url(&self) -> String {
        format!("{}/users/sync", self.api_root)
    }

    fn user_url(&self) -> String {
        format!("{}/users/", self.api_root)
    }

    fn auth_value(token: &str) -> String {
        format!("token {token}")
    }

    async fn exchange(&self, source_token: &str) -> Result<Option<String>, TravisCiError> {
        let response = HTTP_CLIENT
            .post(self.auth_url())
            .form(&[("github_token", source_token)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        // A token absent from an otherwise well-formed body and a body that
        // is not the expected shape both mean "not a CI user" here.
        let token = response
            .json::<TokenResponse>()
            .await
            .ok()
            .and_then(|body| body.access_token);
        Ok(token)
    }

    async fn probe_linked_account(
        &self,
        source_token: &str,
    ) -> Result<Option<String>, TravisCiError> {
        let Some(ci_token) = self.exchange(source_token).await? else {
            return Ok(None);
        };
        let linked = self
            .probe_sync_status(&ci_token)
            .await?
            .is_some_and(|sync| sync.synced_at.is_some());
        Ok(linked.then_some(ci_token))
    }

    async fn probe_project_id(
        &self,
        repo: &RepoRef,
        ci_token: &str,
    ) -> Result<Option<ProjectId>, TravisCiError> {
        let response = HTTP_CLIENT
            .get(self.hooks_url())
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(ci_token))
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let hooks: Vec<HookEntry> =
            response
                .json()
                .await
                .map_err(|err| TravisCiError::Decode {
                    operation: "find_project_id",
                    message: err.to_string(),
                })?;
        if !hook_listed(&hooks, repo) {
            debug!(repo = %repo, "no hook entry registered for repository");
            return Ok(None);
        }
        let project = HTTP_CLIENT.get(self.project_url(repo)).send().await?;
        if !project.status().is_success() {
            return Ok(None);
        }
        let body: RepoResponse = project.json().await.map_err(|err| TravisCiError::Decode {
            operation: "find_project_id",
            message: err.to_string(),
        })?;
        Ok(body.id.map(ProjectId::new))
    }

    async fn activate_hook(&self, id: ProjectId, ci_token: &str) -> Result<bool, TravisCiError> {
        let payload = HookUpdatePayload {
            hook: HookUpdate {
                active: true,
                id: id.value(),
            },
        };
        let response = HTTP_CLIENT
            .put(self.hook_url(id))
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(ci_token))
            .json(&payload)
            .send()
            .await?;
        let enabled = response.status().is_success();
        if !enabled {
            warn!(id = id.value(), status = %response.status(), "hook activation refused");
        }
        Ok(enabled)
    }

    async fn fetch_public_key(&self, repo: &RepoRef) -> Result<Option<String>, TravisCiError> {
        let response = HTTP_CLIENT.get(self.project_url(repo)).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: RepoResponse =
            response
                .json()
                .await
                .map_err(|err| TravisCiError::Decode {
                    operation: "public_key",
                    message: err.to_string(),
                })?;
        Ok(body.public_key.as_deref().map(normalize_public_key_pem))
    }

    async fn start_sync(&self, ci_token: &str) -> Result<bool, TravisCiError> {
        let response = HTTP_CLIENT
            .post(self.sync_url())
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(ci_token))
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let acknowledged = response
            .json::<SyncTriggerResponse>()
            .await
            .ok()
            .and_then(|body| body.result)
            .unwrap_or(false);
        Ok(acknowledged)
    }

    async fn probe_sync_status(
        &self,
        ci_token: &str,
    ) -> Result<Option<SyncStatus>, TravisCiError> {
        let response = HTTP_CLIENT
            .get(self.user_url())
            .header(reqwest::header::AUTHORIZATION, Self::auth_value(ci_token))
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: UserResponse = response.json().await.map_err(|err| TravisCiError::Decode {
            operation: "sync_status",
            message: err.to_string(),
        })?;
        Ok(Some(SyncStatus {
            is_syncing: body.is_syncing.unwrap_or(false),
            synced_at: body.synced_at,
        }))
    }
}

impl CiHost for TravisCi {
    type Error = TravisCiError;

    fn exchange_token<'a>(
        &'a self,
        source_token: &'a str,
    ) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move { self.exchange(source_token).await })
    }

    fn linked_account<'a>(
        &'a self,
        source_token: &'a str,
    ) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move { self.probe_linked_account(source_token).await })
    }

    fn find_project_id<'a>(
        &'a self,
        repo: &'a RepoRef,
        ci_token: &'a str,
    ) -> HostFuture<'a, Option<ProjectId>, Self::Error> {
        Box::pin(async move { self.probe_project_id(repo, ci_token).await })
    }

    fn enable_hook<'a>(
        &'a self,
        id: ProjectId,
        ci_token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move { self.activate_hook(id, ci_token).await })
    }

    fn public_key<'a>(
        &'a self,
        repo: &'a RepoRef,
    ) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move { self.fetch_public_key(repo).await })
    }

    fn trigger_sync<'a>(&'a self, ci_token: &'a str) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move { self.start_sync(ci_token).await })
    }

    fn sync_status<'a>(
        &'a self,
        ci_token: &'a str,
    ) -> HostFuture<'a, Option<SyncStatus>, Self::Error> {
        Box::pin(async move { self.probe_sync_status(ci_token).await })
    }

    fn status(&self) -> HostFuture<'_, String, Self::Error> {
        Box::pin(async move { Ok(status::fetch_status(&HTTP_CLIENT, &self.status_url).await) })
    }
}

/// Whether the hook listing contains an entry for exactly this repository.
///
/// Matching is case-sensitive on both halves; a differently-cased or
/// substring match is not a match.
fn hook_listed(hooks: &[HookEntry], repo: &RepoRef) -> bool {
    hooks
        .iter()
        .any(|hook| hook.owner_name == repo.owner() && hook.name == repo.name())
}

/// Rewrites the host's RSA-specific PEM header and footer to the generic
/// public-key form expected by a standard PKCS#8 loader.
fn normalize_public_key_pem(pem: &str) -> String {
    pem.replace("RSA PUBLIC", "PUBLIC")
}

//! Wire types for the GitHub v3 REST API.

use serde::{Deserialize, Serialize};

/// Subset of a contents response needed for the existence/hash probe.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentsResponse {
    /// Blob SHA of the path's current content.
    pub(crate) sha: String,
}

/// Subset of an account lookup response.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountResponse {
    /// Account classification, `User` or `Organization`.
    #[serde(rename = "type")]
    pub(crate) kind: String,
}

/// Identity block attached to content writes.
#[derive(Clone, Copy, Debug, Serialize)]
pub(crate) struct CommitIdentity<'a> {
    pub(crate) name: &'a str,
    pub(crate) email: &'a str,
}

/// Payload for the contents create-or-update endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct CommitPayload<'a> {
    pub(crate) path: &'a str,
    pub(crate) message: &'a str,
    /// Base64-encoded file content.
    pub(crate) content: String,
    /// Precondition hash; present turns the write into an update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) branch: Option<&'a str>,
    pub(crate) author: CommitIdentity<'a>,
    pub(crate) committer: CommitIdentity<'a>,
}

/// Payload for repository creation, with conservative feature defaults.
#[derive(Debug, Serialize)]
pub(crate) struct CreateRepoPayload<'a> {
    pub(crate) name: &'a str,
    pub(crate) description: &'a str,
    pub(crate) homepage: String,
    pub(crate) private: bool,
    pub(crate) has_issues: bool,
    pub(crate) has_wiki: bool,
    pub(crate) has_downloads: bool,
}

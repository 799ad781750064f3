//! Wire types for the Travis CI API.

use serde::{Deserialize, Serialize};

/// Response to a source-token exchange.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: Option<String>,
}

/// One entry in the authenticated hook listing.
#[derive(Debug, Deserialize)]
pub(crate) struct HookEntry {
    /// Repository name without the owner prefix.
    pub(crate) name: String,
    /// Account owning the repository.
    pub(crate) owner_name: String,
}

/// Subset of a project lookup response.
#[derive(Debug, Deserialize)]
pub(crate) struct RepoResponse {
    pub(crate) id: Option<u64>,
    pub(crate) public_key: Option<String>,
}

/// Acknowledgement returned when a sync is triggered.
#[derive(Debug, Deserialize)]
pub(crate) struct SyncTriggerResponse {
    pub(crate) result: Option<bool>,
}

/// Account metadata returned by the users endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub(crate) is_syncing: Option<bool>,
    pub(crate) synced_at: Option<String>,
}

/// Body of a hook activation request.
#[derive(Debug, Serialize)]
pub(crate) struct HookUpdatePayload {
    pub(crate) hook: HookUpdate,
}

/// Inner hook state for an activation request.
#[derive(Debug, Serialize)]
pub(crate) struct HookUpdate {
    pub(crate) active: bool,
    pub(crate) id: u64,
}

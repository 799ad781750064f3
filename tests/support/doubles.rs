//! Scripted gateway doubles for provisioning scenarios.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use thiserror::Error;

use deckhand::ci::{CiHost, ProjectId, SyncStatus};
use deckhand::repo::RepoRef;
use deckhand::source::{
    AccountKind, ContentHash, CreateOutcome, FileSpec, HostFuture, SourceHost,
};

/// Transport failure injected by the doubles.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("scripted transport failure")]
pub struct DoubleError;

/// SPKI PEM for a throwaway RSA key, generated once per test process.
pub fn test_public_key_pem() -> String {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 1024)
            .unwrap_or_else(|err| panic!("generate key: {err}"));
        private
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap_or_else(|err| panic!("encode public key: {err}"))
    })
    .clone()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| panic!("lock poisoned: {err}"))
}

/// Call counters recorded by the source host double.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SourceCalls {
    pub repository_exists: u32,
    pub create_repository: u32,
    pub path_exists: u32,
    pub commit_file: u32,
}

#[derive(Debug)]
struct SourceState {
    repository_exists: bool,
    create_outcome: CreateOutcome,
    existing_paths: Vec<String>,
    commit_succeeds: bool,
    committed: Vec<FileSpec>,
    calls: SourceCalls,
}

impl Default for SourceState {
    fn default() -> Self {
        Self {
            repository_exists: true,
            create_outcome: CreateOutcome::Created,
            existing_paths: Vec::new(),
            commit_succeeds: true,
            committed: Vec::new(),
            calls: SourceCalls::default(),
        }
    }
}

/// Scripted source host double recording every interaction.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    state: Arc<Mutex<SourceState>>,
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SourceState::default())),
        }
    }

    pub fn repository_absent(&self) {
        lock(&self.state).repository_exists = false;
    }

    pub fn creation_yields(&self, outcome: CreateOutcome) {
        lock(&self.state).create_outcome = outcome;
    }

    pub fn path_already_exists(&self, path: &str) {
        lock(&self.state).existing_paths.push(path.to_owned());
    }

    pub fn fail_commits(&self) {
        lock(&self.state).commit_succeeds = false;
    }

    pub fn calls(&self) -> SourceCalls {
        lock(&self.state).calls
    }

    pub fn committed_paths(&self) -> Vec<String> {
        lock(&self.state)
            .committed
            .iter()
            .map(|spec| spec.path.clone())
            .collect()
    }

    pub fn committed_spec(&self, path: &str) -> Option<FileSpec> {
        lock(&self.state)
            .committed
            .iter()
            .find(|spec| spec.path == path)
            .cloned()
    }
}

impl SourceHost for ScriptedSource {
    type Error = DoubleError;

    fn repository_exists<'a>(
        &'a self,
        _repo: &'a RepoRef,
        _token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.repository_exists += 1;
            Ok(state.repository_exists)
        })
    }

    fn path_exists<'a>(
        &'a self,
        _repo: &'a RepoRef,
        path: &'a str,
        _token: &'a str,
    ) -> HostFuture<'a, Option<ContentHash>, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.path_exists += 1;
            let existing = state.existing_paths.iter().any(|known| known == path);
            Ok(existing.then(|| ContentHash::new("f00dfeed")))
        })
    }

    fn commit_file<'a>(
        &'a self,
        _repo: &'a RepoRef,
        spec: &'a FileSpec,
        _token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.commit_file += 1;
            if state.commit_succeeds {
                state.committed.push(spec.clone());
            }
            Ok(state.commit_succeeds)
        })
    }

    fn create_repository<'a>(
        &'a self,
        _repo: &'a RepoRef,
        _token: &'a str,
    ) -> HostFuture<'a, CreateOutcome, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.create_repository += 1;
            Ok(state.create_outcome)
        })
    }

    fn resolve_owner<'a>(
        &'a self,
        _repo: &'a RepoRef,
        _token: &'a str,
    ) -> HostFuture<'a, AccountKind, Self::Error> {
        Box::pin(async move { Ok(AccountKind::User) })
    }

    fn status(&self) -> HostFuture<'_, String, Self::Error> {
        Box::pin(async move { Ok("All Systems Operational".to_owned()) })
    }
}

/// Call counters recorded by the CI host double.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CiCalls {
    pub linked_account: u32,
    pub find_project_id: u32,
    pub trigger_sync: u32,
    pub sync_status: u32,
    pub enable_hook: u32,
    pub public_key: u32,
}

#[derive(Debug)]
struct CiState {
    linked_token: Option<String>,
    project_ids: VecDeque<Option<u64>>,
    trigger_ack: bool,
    sync_reports: VecDeque<Option<SyncStatus>>,
    hook_result: bool,
    public_key: Option<String>,
    enabled_hooks: Vec<ProjectId>,
    calls: CiCalls,
}

impl Default for CiState {
    fn default() -> Self {
        Self {
            linked_token: Some("travis-token".to_owned()),
            project_ids: VecDeque::from(vec![Some(42)]),
            trigger_ack: true,
            sync_reports: VecDeque::new(),
            hook_result: true,
            public_key: Some(test_public_key_pem()),
            enabled_hooks: Vec::new(),
            calls: CiCalls::default(),
        }
    }
}

/// Scripted CI host double recording every interaction.
#[derive(Clone, Debug)]
pub struct ScriptedCi {
    state: Arc<Mutex<CiState>>,
}

impl Default for ScriptedCi {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CiState::default())),
        }
    }

    pub fn account_not_linked(&self) {
        lock(&self.state).linked_token = None;
    }

    /// Scripts successive `find_project_id` results, first element first.
    pub fn project_lookups(&self, ids: Vec<Option<u64>>) {
        lock(&self.state).project_ids = ids.into();
    }

    pub fn refuse_sync_trigger(&self) {
        lock(&self.state).trigger_ack = false;
    }

    /// Scripts successive sync status reports, first element first.
    pub fn sync_reports(&self, reports: Vec<Option<SyncStatus>>) {
        lock(&self.state).sync_reports = reports.into();
    }

    pub fn fail_hook_activation(&self) {
        lock(&self.state).hook_result = false;
    }

    pub fn no_public_key(&self) {
        lock(&self.state).public_key = None;
    }

    pub fn calls(&self) -> CiCalls {
        lock(&self.state).calls
    }

    pub fn enabled_hooks(&self) -> Vec<ProjectId> {
        lock(&self.state).enabled_hooks.clone()
    }
}

impl CiHost for ScriptedCi {
    type Error = DoubleError;

    fn exchange_token<'a>(
        &'a self,
        _source_token: &'a str,
    ) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move { Ok(lock(&self.state).linked_token.clone()) })
    }

    fn linked_account<'a>(
        &'a self,
        _source_token: &'a str,
    ) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.linked_account += 1;
            Ok(state.linked_token.clone())
        })
    }

    fn find_project_id<'a>(
        &'a self,
        _repo: &'a RepoRef,
        _ci_token: &'a str,
    ) -> HostFuture<'a, Option<ProjectId>, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.find_project_id += 1;
            let next = state
                .project_ids
                .pop_front()
                .unwrap_or_else(|| panic!("provisioner looked up the project beyond the script"));
            Ok(next.map(ProjectId::new))
        })
    }

    fn enable_hook<'a>(
        &'a self,
        id: ProjectId,
        _ci_token: &'a str,
    ) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.enable_hook += 1;
            if state.hook_result {
                state.enabled_hooks.push(id);
            }
            Ok(state.hook_result)
        })
    }

    fn public_key<'a>(&'a self, _repo: &'a RepoRef) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.public_key += 1;
            Ok(state.public_key.clone())
        })
    }

    fn trigger_sync<'a>(&'a self, _ci_token: &'a str) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.trigger_sync += 1;
            Ok(state.trigger_ack)
        })
    }

    fn sync_status<'a>(
        &'a self,
        _ci_token: &'a str,
    ) -> HostFuture<'a, Option<SyncStatus>, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.calls.sync_status += 1;
            let next = state
                .sync_reports
                .pop_front()
                .unwrap_or_else(|| panic!("provisioner polled sync status beyond the script"));
            Ok(next)
        })
    }

    fn status(&self) -> HostFuture<'_, String, Self::Error> {
        Box::pin(async move { Ok("All Systems Operational".to_owned()) })
    }
}

/// A sync report in the "still running" state.
pub fn report_syncing() -> Option<SyncStatus> {
    Some(SyncStatus {
        is_syncing: true,
        synced_at: None,
    })
}

/// A sync report in the "finished" state.
pub fn report_idle() -> Option<SyncStatus> {
    Some(SyncStatus {
        is_syncing: false,
        synced_at: Some("2014-02-01T00:00:00Z".to_owned()),
    })
}

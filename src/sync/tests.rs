//! Tests for the sync waiter's backoff schedule and terminal states.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use super::{SyncOutcome, SyncWaiter};
use crate::ci::{CiHost, ProjectId, SyncStatus};
use crate::repo::RepoRef;
use crate::source::HostFuture;

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("scripted transport failure")]
struct ScriptedError;

enum Step {
    Report(Option<SyncStatus>),
    Fail,
}

fn syncing() -> Step {
    Step::Report(Some(SyncStatus {
        is_syncing: true,
        synced_at: None,
    }))
}

fn idle() -> Step {
    Step::Report(Some(SyncStatus {
        is_syncing: false,
        synced_at: Some("2014-02-01T00:00:00Z".to_owned()),
    }))
}

/// Scripted CI host double that replays sync status responses and records
/// when each query arrived on the virtual clock.
struct ScriptedCi {
    steps: Mutex<VecDeque<Step>>,
    polls: Mutex<Vec<Instant>>,
}

impl ScriptedCi {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            polls: Mutex::new(Vec::new()),
        }
    }

    fn poll_offsets(&self, start: Instant) -> Vec<Duration> {
        self.polls
            .lock()
            .unwrap_or_else(|err| panic!("lock poisoned: polls: {err}"))
            .iter()
            .map(|at| *at - start)
            .collect()
    }
}

impl CiHost for ScriptedCi {
    type Error = ScriptedError;

    fn exchange_token<'a>(&'a self, _: &'a str) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move { panic!("unused by the waiter") })
    }

    fn linked_account<'a>(&'a self, _: &'a str) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move { panic!("unused by the waiter") })
    }

    fn find_project_id<'a>(
        &'a self,
        _: &'a RepoRef,
        _: &'a str,
    ) -> HostFuture<'a, Option<ProjectId>, Self::Error> {
        Box::pin(async move { panic!("unused by the waiter") })
    }

    fn enable_hook<'a>(&'a self, _: ProjectId, _: &'a str) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move { panic!("unused by the waiter") })
    }

    fn public_key<'a>(&'a self, _: &'a RepoRef) -> HostFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move { panic!("unused by the waiter") })
    }

    fn trigger_sync<'a>(&'a self, _: &'a str) -> HostFuture<'a, bool, Self::Error> {
        Box::pin(async move { panic!("unused by the waiter") })
    }

    fn sync_status<'a>(
        &'a self,
        _ci_token: &'a str,
    ) -> HostFuture<'a, Option<SyncStatus>, Self::Error> {
        Box::pin(async move {
            self.polls
                .lock()
                .unwrap_or_else(|err| panic!("lock poisoned: polls: {err}"))
                .push(Instant::now());
            let step = self
                .steps
                .lock()
                .unwrap_or_else(|err| panic!("lock poisoned: steps: {err}"))
                .pop_front();
            match step {
                Some(Step::Report(sync)) => Ok(sync),
                Some(Step::Fail) => Err(ScriptedError),
                None => panic!("waiter polled beyond the script"),
            }
        })
    }

    fn status(&self) -> HostFuture<'_, String, Self::Error> {
        Box::pin(async move { panic!("unused by the waiter") })
    }
}

fn seconds(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_secs).collect()
}

#[tokio::test(start_paused = true)]
async fn six_syncing_responses_walk_the_full_schedule_then_time_out() {
    let ci = ScriptedCi::new(vec![
        syncing(),
        syncing(),
        syncing(),
        syncing(),
        syncing(),
        syncing(),
    ]);
    let start = Instant::now();

    let outcome = SyncWaiter::new()
        .wait(&ci, "travis-token")
        .await
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert_eq!(outcome, SyncOutcome::TimedOut);
    assert!(!outcome.is_finished());
    // Polls land after sleeps of 1, 2, 4, 8, 16 seconds; the final 32 second
    // sleep runs before the waiter gives up.
    assert_eq!(ci.poll_offsets(start), seconds(&[0, 1, 3, 7, 15, 31]));
    assert_eq!(start.elapsed(), Duration::from_secs(63));
}

#[tokio::test(start_paused = true)]
async fn idle_account_finishes_without_sleeping() {
    let ci = ScriptedCi::new(vec![idle()]);
    let start = Instant::now();

    let outcome = SyncWaiter::new()
        .wait(&ci, "travis-token")
        .await
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert_eq!(outcome, SyncOutcome::Finished);
    assert_eq!(ci.poll_offsets(start), seconds(&[0]));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn sync_finishing_midway_stops_the_schedule() {
    let ci = ScriptedCi::new(vec![syncing(), syncing(), idle()]);
    let start = Instant::now();

    let outcome = SyncWaiter::new()
        .wait(&ci, "travis-token")
        .await
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert_eq!(outcome, SyncOutcome::Finished);
    assert_eq!(ci.poll_offsets(start), seconds(&[0, 1, 3]));
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn failed_query_aborts_immediately_without_a_further_sleep() {
    let ci = ScriptedCi::new(vec![syncing(), Step::Report(None)]);
    let start = Instant::now();

    let outcome = SyncWaiter::new()
        .wait(&ci, "travis-token")
        .await
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert_eq!(outcome, SyncOutcome::Aborted);
    assert_eq!(ci.poll_offsets(start), seconds(&[0, 1]));
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn failure_on_the_first_query_aborts_at_once() {
    let ci = ScriptedCi::new(vec![Step::Report(None)]);

    let outcome = SyncWaiter::new()
        .wait(&ci, "travis-token")
        .await
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert_eq!(outcome, SyncOutcome::Aborted);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_propagates_unchanged() {
    let ci = ScriptedCi::new(vec![Step::Fail]);

    let result = SyncWaiter::new().wait(&ci, "travis-token").await;

    assert_eq!(result, Err(ScriptedError));
}

#[tokio::test(start_paused = true)]
async fn base_delay_override_scales_the_schedule() {
    let ci = ScriptedCi::new(vec![syncing(), syncing(), idle()]);
    let start = Instant::now();

    let outcome = SyncWaiter::new()
        .with_base_delay(Duration::from_millis(10))
        .wait(&ci, "travis-token")
        .await
        .unwrap_or_else(|err| panic!("wait: {err}"));

    assert_eq!(outcome, SyncOutcome::Finished);
    assert_eq!(start.elapsed(), Duration::from_millis(30));
}

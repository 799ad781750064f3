//! Bounded-retry polling for the CI host's asynchronous account sync.

#[cfg(test)]
mod tests;

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ci::CiHost;

/// Maximum number of status queries in one wait.
const MAX_ATTEMPTS: u32 = 6;
/// Delay unit; the sleep after attempt `n` is `2^n` units.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Terminal outcome of one wait.
///
/// Only [`SyncOutcome::Finished`] counts as success. `Aborted` and `TimedOut`
/// are merged into one user-facing category by callers but stay
/// distinguishable here and in telemetry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncOutcome {
    /// The host reported the sync as no longer running.
    Finished,
    /// A status query failed; the wait stopped without further attempts.
    Aborted,
    /// Every attempt still reported a running sync.
    TimedOut,
}

impl SyncOutcome {
    /// Whether the wait confirmed a completed sync.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Waits for the CI host's repository resync to finish.
///
/// The wait sleeps on the task's timer only and holds no process-wide lock,
/// so concurrent provisioning runs back off independently.
#[derive(Clone, Copy, Debug)]
pub struct SyncWaiter {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for SyncWaiter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncWaiter {
    /// Creates a waiter with the standard six-attempt exponential schedule
    /// (1, 2, 4, 8, 16, 32 seconds).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        }
    }

    /// Overrides the delay unit.
    ///
    /// This is primarily used by tests to keep schedule scenarios fast.
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Polls the account sync status until a terminal outcome.
    ///
    /// Each "still syncing" response sleeps `2^attempt` delay units,
    /// including the final one, so the worst case waits the full schedule
    /// before timing out.
    ///
    /// # Errors
    ///
    /// Returns the gateway's transport error unchanged; a query that merely
    /// reports a non-success status resolves to [`SyncOutcome::Aborted`]
    /// instead.
    pub async fn wait<C: CiHost>(&self, ci: &C, ci_token: &str) -> Result<SyncOutcome, C::Error> {
        for attempt in 0..self.max_attempts {
            let Some(sync) = ci.sync_status(ci_token).await? else {
                warn!(attempt, "sync status query failed, aborting wait");
                return Ok(SyncOutcome::Aborted);
            };
            if !sync.is_syncing {
                debug!(attempt, "account sync finished");
                return Ok(SyncOutcome::Finished);
            }
            let delay = self.base_delay * 2_u32.pow(attempt);
            debug!(attempt, ?delay, "still syncing, backing off");
            sleep(delay).await;
        }
        warn!(attempts = self.max_attempts, "account sync did not finish, giving up");
        Ok(SyncOutcome::TimedOut)
    }
}

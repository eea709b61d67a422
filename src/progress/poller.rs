//! Status polling loop for a single airdrop job.
//!
//! The loop is strictly sequential: the next request is only scheduled once
//! the previous response (or failure) has been handled, so there is never more
//! than one request in flight per job. Failures are logged and retried on a
//! longer delay; they never reach the display or the caller.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::StatusSource;
use crate::progress::display::{ProgressDisplay, ProgressView};
use crate::timer::TimerHandle;

/// Delay before the next poll after an in-progress snapshot.
pub const POLL_INTERVAL: Duration = Duration::from_millis(3000);
/// Delay before retrying after a failed request.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimings {
    pub interval: Duration,
    pub retry: Duration,
}

impl Default for PollTimings {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            retry: RETRY_INTERVAL,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("airdrop id is empty")]
    EmptyJobId,
}

/// Opaque, non-empty identifier of an airdrop job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(raw: impl Into<String>) -> Result<Self, SetupError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SetupError::EmptyJobId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Completed,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    InProgress(ProgressView),
    Completed,
    Failed,
}

impl PollOutcome {
    /// How long to wait before the next cycle, or `None` once terminal.
    pub fn next_delay(&self, timings: &PollTimings) -> Option<Duration> {
        match self {
            PollOutcome::InProgress(_) => Some(timings.interval),
            PollOutcome::Failed => Some(timings.retry),
            PollOutcome::Completed => None,
        }
    }
}

pub struct ProgressPoller<S, D> {
    job_id: JobId,
    source: Arc<S>,
    display: D,
    timings: PollTimings,
    state: PollState,
}

impl<S, D> ProgressPoller<S, D>
where
    S: StatusSource,
    D: ProgressDisplay,
{
    pub fn new(job_id: JobId, source: Arc<S>, display: D) -> Self {
        Self {
            job_id,
            source,
            display,
            timings: PollTimings::default(),
            state: PollState::Polling,
        }
    }

    pub fn with_timings(mut self, timings: PollTimings) -> Self {
        self.timings = timings;
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Run a single poll cycle: one status request and one render.
    ///
    /// Once the job has been seen completed this returns immediately without
    /// issuing a request.
    pub async fn poll(&mut self) -> PollOutcome {
        if self.state == PollState::Completed {
            return PollOutcome::Completed;
        }

        match self.source.fetch_status(self.job_id.as_str()).await {
            Ok(status) => {
                debug!(
                    job = %self.job_id,
                    status = status.status.as_deref().unwrap_or("<none>"),
                    total = status.total(),
                    completed = status.completed(),
                    success = ?status.success,
                    failed = ?status.failed,
                    airdrop_id = ?status.airdrop_id,
                    reported_percentage = ?status.progress_percentage,
                    "airdrop status"
                );
                let view = ProgressView::from_status(&status);
                view.render(&mut self.display);
                if status.is_terminal() {
                    info!(job = %self.job_id, "airdrop completed");
                    self.state = PollState::Completed;
                    PollOutcome::Completed
                } else {
                    PollOutcome::InProgress(view)
                }
            }
            Err(err) => {
                warn!(
                    job = %self.job_id,
                    error = %err,
                    retry_in_ms = self.timings.retry.as_millis() as u64,
                    "error updating airdrop progress"
                );
                PollOutcome::Failed
            }
        }
    }

    /// Poll until the job completes. Never returns otherwise; cancel it by
    /// dropping the future or stopping the handle returned from [`spawn`].
    ///
    /// [`spawn`]: ProgressPoller::spawn
    pub async fn run(mut self) {
        loop {
            let outcome = self.poll().await;
            match outcome.next_delay(&self.timings) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => break,
            }
        }
    }

    pub fn spawn(self) -> TimerHandle {
        TimerHandle::spawn(self.run())
    }
}

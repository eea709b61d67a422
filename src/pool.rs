// pool.rs: starts the dashboard components and collects what they render

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::StatusSource;
use crate::countdown::{Clock, CountdownTimer};
use crate::event::{ChannelCountdownDisplay, ChannelProgressDisplay, Event};
use crate::progress::{JobId, PollTimings, ProgressPoller};
use crate::state::{Change, DashboardState};
use crate::timer::TimerHandle;

/// A countdown requested on the command line as `[LABEL=]TIMESTAMP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownSpec {
    pub label: String,
    pub raw: String,
}

impl CountdownSpec {
    pub fn parse_arg(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((label, raw)) if !label.trim().is_empty() => Self {
                label: label.trim().to_string(),
                raw: raw.trim().to_string(),
            },
            _ => Self {
                label: arg.trim().to_string(),
                raw: arg.trim().to_string(),
            },
        }
    }
}

/// The job to watch, if any, and where its status comes from.
pub struct WatchedJob<S> {
    pub job_id: JobId,
    pub source: Arc<S>,
    pub timings: PollTimings,
}

/// Running components plus the state they render into.
///
/// The event channel closes once every component has stopped for good: the
/// poller after it saw the job complete, countdowns only when stopped.
pub struct Dashboard {
    pub state: DashboardState,
    events: mpsc::UnboundedReceiver<Event>,
    poller: Option<TimerHandle>,
    countdowns: Vec<TimerHandle>,
}

impl Dashboard {
    pub fn start<S: StatusSource>(
        job: Option<WatchedJob<S>>,
        countdowns: &[CountdownSpec],
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let state = DashboardState::new(
            job.as_ref().map(|j| j.job_id.to_string()),
            countdowns.iter().map(|c| c.label.clone()).collect(),
        );

        let poller = job.map(|job| {
            ProgressPoller::new(job.job_id, job.source, ChannelProgressDisplay::new(tx.clone()))
                .with_timings(job.timings)
                .spawn()
        });

        let countdowns = countdowns
            .iter()
            .enumerate()
            .filter_map(|(slot, spec)| {
                let display = ChannelCountdownDisplay::new(slot, tx.clone());
                CountdownTimer::attach(&spec.raw, display, clock.clone()).ok()
            })
            .collect();

        Self {
            state,
            events,
            poller,
            countdowns,
        }
    }

    /// Wait for the next render, then fold in everything else already queued.
    ///
    /// Returns the distinct regions that changed, or `None` once every
    /// component is gone. Cancel safe.
    pub async fn next_changes(&mut self) -> Option<Vec<Change>> {
        let first = self.events.recv().await?;
        let mut changes = Vec::new();
        self.apply_into(first, &mut changes);
        while let Ok(event) = self.events.try_recv() {
            self.apply_into(event, &mut changes);
        }
        Some(changes)
    }

    fn apply_into(&mut self, event: Event, changes: &mut Vec<Change>) {
        if let Some(change) = self.state.apply(event)
            && !changes.contains(&change)
        {
            changes.push(change);
        }
    }

    pub fn stop(&mut self) {
        if let Some(poller) = self.poller.as_mut() {
            poller.stop();
        }
        for countdown in &mut self.countdowns {
            countdown.stop();
        }
    }
}

//! Poll scheduler: the host loop that drives [`PollingSource`]s.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::ports::PollingSource;

/// First deadline used when an interval is too large to be added to now.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Runs one background task per polling source.
///
/// Each task waits a full interval before the first refresh, since setup
/// already forced one. Refreshes of the same source never overlap.
#[derive(Default)]
pub struct PollScheduler {
    handles: Vec<JoinHandle<()>>,
}

impl PollScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start refreshing `source` on its own interval.
    pub fn schedule<P>(&mut self, source: Arc<P>)
    where
        P: PollingSource + 'static,
    {
        tracing::debug!(
            source = source.name(),
            interval_secs = source.update_interval().as_secs(),
            "polling scheduled"
        );
        self.handles.push(tokio::spawn(poll_loop(source)));
    }

    /// Number of scheduled sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stop every polling task.
    pub fn shutdown(&mut self) {
        let count = self.handles.len();
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        tracing::debug!(tasks = count, "poll scheduler stopped");
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

async fn poll_loop<P: PollingSource>(source: Arc<P>) {
    let period = source.update_interval();
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or_else(|| now + FAR_FUTURE);
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(err) = source.refresh().await {
            tracing::warn!(source = source.name(), error = %err, "refresh failed");
        }
    }
}

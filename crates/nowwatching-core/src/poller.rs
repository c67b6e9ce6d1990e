use crate::coordinator::{WatchingCoordinator, WatchingSnapshot};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle to a running poll loop.
pub struct PollerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    state: watch::Receiver<Option<WatchingSnapshot>>,
}

impl PollerHandle {
    /// Move `coordinator` onto a background task that refreshes, then sleeps
    /// for the coordinator's current interval, until cancelled.
    pub fn spawn(coordinator: WatchingCoordinator) -> Self {
        let cancel = coordinator.shutdown_token();
        let state = coordinator.subscribe();
        let task = tokio::spawn(run(coordinator, cancel.clone()));

        Self { cancel, task, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<WatchingSnapshot>> {
        self.state.clone()
    }

    pub fn latest(&self) -> Option<WatchingSnapshot> {
        self.state.borrow().clone()
    }

    /// Stop polling. An in-flight refresh is abandoned and never published.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(operation = "poller_shutdown", error = %e, "Poll task ended abnormally");
        }
    }
}

async fn run(mut coordinator: WatchingCoordinator, cancel: CancellationToken) {
    info!(
        operation = "poller_started",
        interval_secs = coordinator.interval_duration().as_secs(),
        "Watching poller started"
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = coordinator.refresh() => match result {
                Ok(status) => debug!(
                    operation = "refresh",
                    playing = status.is_playing(),
                    "Refresh cycle completed"
                ),
                Err(e) => warn!(
                    operation = "refresh",
                    error = %e,
                    timeout = e.is_timeout(),
                    "Refresh cycle failed, retrying at next tick"
                ),
            },
        }

        let delay = coordinator.interval_duration();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    info!(operation = "poller_stopped", "Watching poller stopped");
}

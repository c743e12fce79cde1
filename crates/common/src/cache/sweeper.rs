//! Periodic background eviction of expired cache entries

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::core::Cache;
use crate::resilience::Clock;

/// Handle to a running sweeper task.
///
/// The task stops when [`SweeperHandle::stop`] is called or the handle is
/// dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for the task to finish
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether the sweeper has been asked to stop
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a task that calls [`Cache::cleanup_expired`] every `period`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_sweeper<K, V, C>(cache: Cache<K, V, C>, period: Duration) -> SweeperHandle
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock + Clone,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let period = period.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = cache.cleanup_expired();
                    if removed > 0 {
                        debug!(removed, "Swept expired cache entries");
                    }
                }
            }
        }
    });

    SweeperHandle { cancel, task: Some(task) }
}

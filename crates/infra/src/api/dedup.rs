//! In-flight request deduplication
//!
//! Concurrent identical reads share one underlying call. The first caller
//! for a key spawns the call as its own task and registers a shared handle
//! to it; later callers await a clone of the handle and receive the same
//! `Result`, success or failure. The task removes the entry when the call
//! settles, whether or not anyone is still awaiting it, so the next caller
//! after that starts a fresh request. The lock is never held across an
//! `.await`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::debug;

use super::errors::ApiError;

type SharedCall<T> = Shared<BoxFuture<'static, Result<T, ApiError>>>;

struct Entry<T: Clone> {
    id: u64,
    call: SharedCall<T>,
}

/// Registry of calls currently in flight, keyed by request identity
pub struct InFlightRegistry<T: Clone> {
    entries: Arc<Mutex<HashMap<String, Entry<T>>>>,
    next_id: AtomicU64,
}

impl<T> Default for InFlightRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InFlightRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self { entries: Arc::new(Mutex::new(HashMap::new())), next_id: AtomicU64::new(0) }
    }

    /// Join the call registered under `key`, or start one with `make`.
    ///
    /// `make` only runs when no call is in flight for `key`. A joining
    /// caller inherits the first caller's request, cancellation included.
    /// Dropping a caller does not stop the shared call.
    pub async fn run<F, Fut>(&self, key: &str, make: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let call = {
            let mut entries = self.entries.lock();
            match entries.get(key) {
                Some(entry) => {
                    debug!(key, "joining in-flight request");
                    entry.call.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let call = self.settle_on_completion(key.to_string(), id, make());
                    entries.insert(key.to_string(), Entry { id, call: call.clone() });
                    call
                }
            }
        };

        call.await
    }

    /// Number of keys with a call in flight
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn settle_on_completion<Fut>(&self, key: String, id: u64, request: Fut) -> SharedCall<T>
    where
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        let task = tokio::spawn(async move {
            let result = request.await;
            let mut entries = entries.lock();
            // A newer call may already own the key.
            if entries.get(&key).is_some_and(|entry| entry.id == id) {
                entries.remove(&key);
            }
            result
        });

        task.map(|joined| {
            joined.unwrap_or_else(|err| {
                Err(ApiError::Transport(format!("in-flight request aborted: {err}")))
            })
        })
        .boxed()
        .shared()
    }
}

//! A rate-limited, per-key-deduplicating workqueue (§4.9, §9's "Workqueue
//! semantics" design note).
//!
//! Mirrors client-go's `workqueue.RateLimitingInterface` closely enough for
//! the reporter's needs: at most one worker processes a given key at a time,
//! re-`Add`ing a key that's already queued or in flight is a no-op (it's
//! simply reprocessed once the in-flight run finishes), and `AddRateLimited`
//! backs off exponentially per key. No crate in the pack provides this
//! shape, so it's hand-built on `tokio::sync`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};

const BASE_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

struct Inner {
    queue: VecDeque<String>,
    dirty: HashSet<String>,
    processing: HashSet<String>,
    retries: HashMap<String, u32>,
    shutting_down: bool,
}

/// A rate-limited workqueue keyed by `namespace/name`, shared between the
/// pod watcher (producer) and the reporter's worker tasks (consumers).
#[derive(Clone)]
pub struct Workqueue {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
}

impl Default for Workqueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Workqueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                queue: VecDeque::new(),
                dirty: HashSet::new(),
                processing: HashSet::new(),
                retries: HashMap::new(),
                shutting_down: false,
            })),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Enqueue `key` for processing. A no-op if `key` is already queued or
    /// currently being processed (it will be reprocessed once `done` runs).
    pub async fn add(&self, key: impl Into<String>) {
        let key = key.into();
        let mut inner = self.inner.lock().await;
        if inner.shutting_down || !inner.dirty.insert(key.clone()) {
            return;
        }
        if inner.processing.contains(&key) {
            return;
        }
        inner.queue.push_back(key);
        drop(inner);
        self.notify.notify_one();
    }

    /// Re-enqueue `key` after an exponential backoff proportional to its
    /// current retry count, and bump that count. Callers are expected to
    /// consult [`Workqueue::num_requeues`] first and call [`Workqueue::forget`]
    /// instead once the retry budget is exhausted.
    pub async fn add_rate_limited(&self, key: impl Into<String>) {
        let key = key.into();
        let retries = {
            let mut inner = self.inner.lock().await;
            let count = inner.retries.entry(key.clone()).or_insert(0);
            *count += 1;
            *count
        };
        let backoff = BASE_BACKOFF
            .saturating_mul(1u32.checked_shl(retries.min(6)).unwrap_or(u32::MAX))
            .min(MAX_BACKOFF);
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(backoff).await;
            this.add(key).await;
        });
    }

    /// Number of times `key` has been requeued via `add_rate_limited` since
    /// its last `forget`.
    pub async fn num_requeues(&self, key: &str) -> u32 {
        self.inner.lock().await.retries.get(key).copied().unwrap_or(0)
    }

    /// Clear `key`'s retry count, indicating it no longer needs rate limiting.
    pub async fn forget(&self, key: &str) {
        self.inner.lock().await.retries.remove(key);
    }

    /// Block until a key is available, or `None` once the queue has shut
    /// down and drained.
    pub async fn get(&self) -> Option<String> {
        loop {
            {
                let mut inner = self.inner.lock().await;
                if let Some(key) = inner.queue.pop_front() {
                    inner.dirty.remove(&key);
                    inner.processing.insert(key.clone());
                    return Some(key);
                }
                if inner.shutting_down {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Mark `key` as finished processing. If it was re-`add`ed while being
    /// processed, it's moved back onto the queue for another pass.
    pub async fn done(&self, key: &str) {
        let mut inner = self.inner.lock().await;
        inner.processing.remove(key);
        if inner.dirty.contains(key) {
            inner.queue.push_back(key.to_string());
            drop(inner);
            self.notify.notify_one();
        }
    }

    /// Stop accepting new work and wake any workers blocked in `get`.
    pub async fn shutdown(&self) {
        self.inner.lock().await.shutting_down = true;
        self.notify.notify_waiters();
    }
}

//! Tracks queued actions and running saga handlers so callers can wait for
//! the engine to go quiet.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    count: AtomicUsize,
    idle: Notify,
}

#[derive(Clone, Default)]
pub struct InflightTracker {
    inner: Arc<Inner>,
}

impl InflightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of outstanding work until the guard drops.
    pub fn enter(&self) -> InflightGuard {
        self.inner.count.fetch_add(1, Ordering::SeqCst);
        InflightGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Resolves once nothing is queued or running.
    pub async fn settled(&self) {
        loop {
            let idle = self.inner.idle.notified();
            if self.count() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Releases its unit of work on drop, including when the task holding it is
/// aborted.
pub struct InflightGuard {
    inner: Arc<Inner>,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if self.inner.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

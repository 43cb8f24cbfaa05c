//! Subscribers notified when a write fails because storage is exhausted.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

/// A zero-argument subscriber invoked on storage exhaustion.
pub type QuotaErrorCallback = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Ordered set of quota-error subscribers.
///
/// Callers construct one registry for the lifetime of the process and hand
/// it to every [`CacheWrapper`](crate::CacheWrapper). Subscribers are only
/// ever appended; there is no removal or lookup.
///
/// Fan-out iterates a snapshot taken under the read lock, so a subscriber
/// that registers another subscriber does not deadlock, and the new one is
/// first called on the next exhaustion.
#[derive(Default)]
pub struct QuotaErrorRegistry {
    callbacks: RwLock<Vec<QuotaErrorCallback>>,
}

impl QuotaErrorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `callback`. Registering the same closure twice calls it twice.
    pub fn register<F>(&self, callback: F)
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.write().push(Arc::new(callback));
    }

    /// Invokes every subscriber in registration order.
    ///
    /// A subscriber that returns an error or panics is logged and skipped;
    /// the remaining subscribers still run.
    pub(crate) fn notify_all(&self) {
        let snapshot = self.callbacks.read().clone();
        for (index, callback) in snapshot.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(subscriber = index, error = %err, "quota error subscriber failed");
                }
                Err(_) => {
                    warn!(subscriber = index, "quota error subscriber panicked");
                }
            }
        }
    }
}

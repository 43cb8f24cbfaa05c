//! Plugin-mediated access to a [`CacheStorage`].
//!
//! [`CacheWrapper`] owns the two entry points:
//!
//! - [`CacheWrapper::put`]: validate, transform, write, notify
//! - [`CacheWrapper::match_request`]: read, transform
//!
//! Both take a [`CallOptions`] carrying the per-call plugin list, the match
//! options forwarded to the store, and the diagnostic event.

mod lookup;
mod put;

use std::fmt;
use std::sync::Arc;

use cachegate_core::{Event, MatchOptions};

use crate::plugin::CachePlugin;
use crate::quota::QuotaErrorRegistry;
use crate::storage::CacheStorage;

/// Per-call inputs shared by `put` and `match_request`.
#[derive(Clone, Copy, Default)]
pub struct CallOptions<'a> {
    /// Plugins to run, in order.
    pub plugins: &'a [Arc<dyn CachePlugin>],
    /// Forwarded verbatim to every store lookup of this call.
    pub match_options: Option<&'a MatchOptions>,
    /// Forwarded verbatim to every hook of this call.
    pub event: Option<&'a Event>,
}

impl<'a> CallOptions<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_plugins(mut self, plugins: &'a [Arc<dyn CachePlugin>]) -> Self {
        self.plugins = plugins;
        self
    }

    #[must_use]
    pub fn with_match_options(mut self, match_options: &'a MatchOptions) -> Self {
        self.match_options = Some(match_options);
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: &'a Event) -> Self {
        self.event = Some(event);
        self
    }
}

impl fmt::Debug for CallOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("match_options", &self.match_options)
            .field("event", &self.event)
            .finish()
    }
}

/// What a successful `put` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// The response was written.
    Stored,
    /// Nothing was written; not an error.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The default policy rejected the status and no plugin took over.
    NotCacheable { status: u16 },
    /// A `cache_will_update` hook returned `None`.
    Vetoed { plugin: String },
}

/// Mediates every read and write to a [`CacheStorage`] through plugin hooks.
///
/// Cheap to clone; clones share the storage and the quota registry.
#[derive(Clone)]
pub struct CacheWrapper {
    storage: Arc<dyn CacheStorage>,
    quota_registry: Arc<QuotaErrorRegistry>,
}

impl CacheWrapper {
    /// Creates a wrapper over `storage` that reports storage exhaustion to
    /// `quota_registry`.
    #[must_use]
    pub fn new(storage: Arc<dyn CacheStorage>, quota_registry: Arc<QuotaErrorRegistry>) -> Self {
        Self {
            storage,
            quota_registry,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    #[must_use]
    pub fn quota_registry(&self) -> &Arc<QuotaErrorRegistry> {
        &self.quota_registry
    }
}

//! Error taxonomy for the cache layers.
//!
//! Storage exhaustion is a typed variant ([`StoreError::QuotaExceeded`]) so
//! the put pipeline can tell it apart from every other store failure with a
//! tag match.

use http::Method;

/// Errors raised by a [`CacheStorage`](crate::storage::CacheStorage) or
/// [`CacheHandle`](crate::storage::CacheHandle) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write would exceed the storage quota.
    #[error("storage quota exceeded: entry needs {requested} bytes, {available} available")]
    QuotaExceeded { requested: u64, available: u64 },
    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Errors returned by [`CacheWrapper`](crate::CacheWrapper) operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Only `GET` requests may be written to the store.
    #[error("cannot cache {method} {url}: only GET requests are cacheable")]
    NonGetRequest { method: Method, url: String },
    /// A store operation failed. Carries the store's error unchanged.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// A transforming plugin hook returned an error.
    #[error("plugin `{plugin}` failed in {hook}")]
    Plugin {
        plugin: String,
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl CacheError {
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_quota_exceeded())
    }
}

/// Invalid construction parameters for a stock plugin.
#[derive(Debug, thiserror::Error)]
pub enum PluginConfigError {
    #[error("cacheable response plugin needs at least one status or header criterion")]
    NoCriteria,
}

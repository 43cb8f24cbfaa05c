//! `cachegate`: plugin-mediated put/match pipeline over a request-keyed
//! response store.
//!
//! Every write goes through [`CacheWrapper::put`] (validate, transform,
//! write, notify) and every read through [`CacheWrapper::match_request`]
//! (read, transform). Writes that fail because storage is exhausted are
//! reported to the subscribers of a [`QuotaErrorRegistry`].

pub mod config;
pub mod error;
pub mod logging;
pub mod plugin;
pub mod quota;
pub mod storage;
pub mod wrapper;

#[cfg(test)]
pub(crate) mod test_support;

pub use cachegate_core::{
    CacheName, Event, MatchOptions, RequestDescriptor, ResponseRecord,
};
pub use config::{CacheGateConfig, ConfigError, LogFormat, LoggingConfig, StorageConfig};
pub use error::{CacheError, PluginConfigError, StoreError};
pub use logging::LoggingError;
pub use plugin::{
    BroadcastUpdatePlugin, CacheDidUpdateContext, CachePlugin, CacheUpdated,
    CacheWillUpdateContext, CacheableResponsePlugin, CachedResponseWillBeUsedContext, PluginHooks,
};
pub use quota::{QuotaErrorCallback, QuotaErrorRegistry};
pub use storage::{CacheHandle, CacheStorage, InMemoryCacheStorage};
pub use wrapper::{CacheWrapper, CallOptions, PutOutcome, SkipReason};

//! Store interface mediated by the cache pipelines.
//!
//! - [`CacheStorage`]: opens named partitions
//! - [`CacheHandle`]: request-keyed reads and writes within one partition
//! - [`InMemoryCacheStorage`]: reference implementation with a byte quota

mod entry;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use cachegate_core::{MatchOptions, RequestDescriptor, ResponseRecord};

use crate::error::StoreError;

pub use memory::{InMemoryCache, InMemoryCacheStorage};

/// A collection of named cache partitions.
///
/// Used as `Arc<dyn CacheStorage>`.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Opens the partition called `name`, creating it if it does not exist.
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheHandle>, StoreError>;

    /// Whether a partition called `name` exists.
    async fn has(&self, name: &str) -> Result<bool, StoreError>;

    /// Deletes the partition called `name`. Returns `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Names of all existing partitions.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// One cache partition: an ordered list of request/response pairs.
#[async_trait]
pub trait CacheHandle: Send + Sync {
    /// Stores `response` for `request`, replacing every entry that `request`
    /// matches under `match_options`.
    ///
    /// Fails with [`StoreError::QuotaExceeded`] when the storage quota would
    /// be exceeded; the partition is left unchanged in that case.
    async fn put(
        &self,
        request: &RequestDescriptor,
        response: &ResponseRecord,
        match_options: Option<&MatchOptions>,
    ) -> Result<(), StoreError>;

    /// Returns the first stored response matching `request`.
    async fn match_entry(
        &self,
        request: &RequestDescriptor,
        match_options: Option<&MatchOptions>,
    ) -> Result<Option<ResponseRecord>, StoreError>;

    /// Removes every entry matching `request`. Returns `false` if none did.
    async fn delete(
        &self,
        request: &RequestDescriptor,
        match_options: Option<&MatchOptions>,
    ) -> Result<bool, StoreError>;

    /// Requests of stored entries, in insertion order. With `request`, only
    /// the entries it matches under `match_options`.
    async fn keys(
        &self,
        request: Option<&RequestDescriptor>,
        match_options: Option<&MatchOptions>,
    ) -> Result<Vec<RequestDescriptor>, StoreError>;
}

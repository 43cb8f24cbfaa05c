//! In-memory [`CacheStorage`] backed by [`DashMap`].
//!
//! Each partition is an ordered entry list behind a `RwLock`. All partitions
//! of one storage share a single byte budget; a write that would overrun it
//! fails with [`StoreError::QuotaExceeded`] and changes nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cachegate_core::{MatchOptions, RequestDescriptor, ResponseRecord};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use super::entry::CacheEntry;
use super::{CacheHandle, CacheStorage};
use crate::config::StorageConfig;
use crate::error::StoreError;

/// Byte accounting shared by every partition of one storage.
#[derive(Debug)]
struct QuotaBudget {
    limit: Option<u64>,
    used: Mutex<u64>,
}

impl QuotaBudget {
    fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            used: Mutex::new(0),
        }
    }

    /// Swaps `released` bytes for `requested` bytes, or fails without
    /// changing usage if the result would exceed the limit.
    fn replace(&self, released: u64, requested: u64) -> Result<(), StoreError> {
        let mut used = self.used.lock();
        let base = used.saturating_sub(released);
        if let Some(limit) = self.limit {
            let available = limit.saturating_sub(base);
            if requested > available {
                return Err(StoreError::QuotaExceeded {
                    requested,
                    available,
                });
            }
        }
        *used = base.saturating_add(requested);
        Ok(())
    }

    fn release(&self, bytes: u64) {
        let mut used = self.used.lock();
        *used = used.saturating_sub(bytes);
    }

    fn used(&self) -> u64 {
        *self.used.lock()
    }
}

/// In-memory collection of cache partitions with an optional byte quota.
pub struct InMemoryCacheStorage {
    caches: DashMap<String, Arc<InMemoryCache>>,
    budget: Arc<QuotaBudget>,
}

impl InMemoryCacheStorage {
    /// Creates an empty storage with no quota.
    #[must_use]
    pub fn new() -> Self {
        Self::with_quota(None)
    }

    /// Creates an empty storage limited to `quota_bytes` across all partitions.
    #[must_use]
    pub fn with_quota(quota_bytes: Option<u64>) -> Self {
        Self {
            caches: DashMap::new(),
            budget: Arc::new(QuotaBudget::new(quota_bytes)),
        }
    }

    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::with_quota(config.quota_bytes)
    }

    /// Bytes currently accounted to stored entries.
    #[must_use]
    pub fn usage(&self) -> u64 {
        self.budget.used()
    }

    /// The configured quota, if any.
    #[must_use]
    pub fn quota(&self) -> Option<u64> {
        self.budget.limit
    }
}

impl Default for InMemoryCacheStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStorage for InMemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheHandle>, StoreError> {
        let cache = self
            .caches
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCache::new(name, Arc::clone(&self.budget))));
        Ok(Arc::clone(cache.value()) as Arc<dyn CacheHandle>)
    }

    async fn has(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.caches.contains_key(name))
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        match self.caches.remove(name) {
            Some((_, cache)) => {
                cache.destroy();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self.caches.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}

/// One in-memory partition.
///
/// Handles outlive [`CacheStorage::delete`]; once the partition is deleted,
/// writes through a stale handle fail and reads find nothing.
pub struct InMemoryCache {
    name: String,
    entries: RwLock<Vec<CacheEntry>>,
    deleted: AtomicBool,
    budget: Arc<QuotaBudget>,
}

impl InMemoryCache {
    fn new(name: &str, budget: Arc<QuotaBudget>) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(Vec::new()),
            deleted: AtomicBool::new(false),
            budget,
        }
    }

    /// Drops every entry and returns their bytes to the budget.
    fn destroy(&self) {
        let mut entries = self.entries.write();
        self.deleted.store(true, Ordering::Release);
        let released: u64 = entries.iter().map(|e| e.cost).sum();
        entries.clear();
        self.budget.release(released);
    }
}

#[async_trait]
impl CacheHandle for InMemoryCache {
    async fn put(
        &self,
        request: &RequestDescriptor,
        response: &ResponseRecord,
        match_options: Option<&MatchOptions>,
    ) -> Result<(), StoreError> {
        if !request.is_get() {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "cannot store {} {}: only GET requests are cached",
                request.method(),
                request.url()
            )));
        }
        let options = match_options.copied().unwrap_or_default();
        let entry = CacheEntry::new(request.clone(), response.clone());

        let mut entries = self.entries.write();
        if self.deleted.load(Ordering::Acquire) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "cache `{}` has been deleted",
                self.name
            )));
        }

        let released: u64 = entries
            .iter()
            .filter(|e| e.matches(request, &options))
            .map(|e| e.cost)
            .sum();
        self.budget.replace(released, entry.cost)?;

        entries.retain(|e| !e.matches(request, &options));
        entries.push(entry);
        Ok(())
    }

    async fn match_entry(
        &self,
        request: &RequestDescriptor,
        match_options: Option<&MatchOptions>,
    ) -> Result<Option<ResponseRecord>, StoreError> {
        let options = match_options.copied().unwrap_or_default();
        Ok(self
            .entries
            .read()
            .iter()
            .find(|e| e.matches(request, &options))
            .map(|e| e.response.clone()))
    }

    async fn delete(
        &self,
        request: &RequestDescriptor,
        match_options: Option<&MatchOptions>,
    ) -> Result<bool, StoreError> {
        let options = match_options.copied().unwrap_or_default();
        let mut entries = self.entries.write();
        let before = entries.len();
        let mut released = 0_u64;
        entries.retain(|e| {
            if e.matches(request, &options) {
                released += e.cost;
                false
            } else {
                true
            }
        });
        self.budget.release(released);
        Ok(entries.len() != before)
    }

    async fn keys(
        &self,
        request: Option<&RequestDescriptor>,
        match_options: Option<&MatchOptions>,
    ) -> Result<Vec<RequestDescriptor>, StoreError> {
        let options = match_options.copied().unwrap_or_default();
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| match request {
                Some(request) => e.matches(request, &options),
                None => true,
            })
            .map(|e| e.request.clone())
            .collect())
    }
}

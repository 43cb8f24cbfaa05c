//! Shared fixtures for pipeline and plugin tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cachegate_core::{MatchOptions, RequestDescriptor, ResponseRecord};
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::plugin::{
    CacheDidUpdateContext, CachePlugin, CacheWillUpdateContext, CachedResponseWillBeUsedContext,
    PluginHooks,
};
use crate::storage::{CacheHandle, CacheStorage, InMemoryCacheStorage};

/// Global ordering log shared across plugins in one test.
pub type OrderLog = Arc<Mutex<Vec<String>>>;

pub fn order_log() -> OrderLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn body_str(response: &ResponseRecord) -> String {
    String::from_utf8(response.body().to_vec()).unwrap()
}

// ---------------------------------------------------------------------------
// Plugins
// ---------------------------------------------------------------------------

/// Appends `suffix` to the body in both transform hooks and logs each call.
pub struct AppendPlugin {
    pub label: &'static str,
    pub suffix: &'static str,
    pub log: OrderLog,
}

impl AppendPlugin {
    pub fn new(label: &'static str, suffix: &'static str, log: &OrderLog) -> Self {
        Self {
            label,
            suffix,
            log: Arc::clone(log),
        }
    }

    fn append(&self, response: &ResponseRecord) -> ResponseRecord {
        let mut body = response.body().to_vec();
        body.extend_from_slice(self.suffix.as_bytes());
        response.with_body(body)
    }
}

#[async_trait]
impl CachePlugin for AppendPlugin {
    fn name(&self) -> &str {
        self.label
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks::NONE
            .with_cache_will_update()
            .with_cached_response_will_be_used()
    }

    async fn cache_will_update(
        &self,
        ctx: CacheWillUpdateContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        self.log.lock().push(format!(
            "will_update:{}:{}",
            self.label,
            body_str(ctx.response)
        ));
        Ok(Some(self.append(ctx.response)))
    }

    async fn cached_response_will_be_used(
        &self,
        ctx: CachedResponseWillBeUsedContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        self.log.lock().push(format!(
            "will_be_used:{}:{}",
            self.label,
            body_str(ctx.cached_response)
        ));
        Ok(Some(self.append(ctx.cached_response)))
    }
}

/// Declares `cache_will_update` and always vetoes.
pub struct VetoPlugin;

#[async_trait]
impl CachePlugin for VetoPlugin {
    fn name(&self) -> &str {
        "veto"
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks::NONE.with_cache_will_update()
    }

    async fn cache_will_update(
        &self,
        _ctx: CacheWillUpdateContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        Ok(None)
    }
}

/// Overrides `cache_will_update` to veto, but declares no hooks.
#[derive(Default)]
pub struct UndeclaredVetoPlugin {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CachePlugin for UndeclaredVetoPlugin {
    fn name(&self) -> &str {
        "undeclared"
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks::NONE
    }

    async fn cache_will_update(
        &self,
        _ctx: CacheWillUpdateContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

/// Declares every hook and fails in every hook.
pub struct FailingPlugin;

#[async_trait]
impl CachePlugin for FailingPlugin {
    fn name(&self) -> &str {
        "failing"
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks::NONE
            .with_cache_will_update()
            .with_cache_did_update()
            .with_cached_response_will_be_used()
    }

    async fn cache_will_update(
        &self,
        _ctx: CacheWillUpdateContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        anyhow::bail!("will_update exploded")
    }

    async fn cache_did_update(&self, _ctx: CacheDidUpdateContext<'_>) -> anyhow::Result<()> {
        anyhow::bail!("did_update exploded")
    }

    async fn cached_response_will_be_used(
        &self,
        _ctx: CachedResponseWillBeUsedContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        anyhow::bail!("will_be_used exploded")
    }
}

/// A `cache_did_update` observation: old body (if any) and new body.
pub type Observed = (Option<String>, String);

/// Records every `cache_did_update` call.
pub struct DidUpdateRecorder {
    pub label: &'static str,
    pub log: OrderLog,
    pub seen: Mutex<Vec<Observed>>,
}

impl DidUpdateRecorder {
    pub fn new(label: &'static str, log: &OrderLog) -> Self {
        Self {
            label,
            log: Arc::clone(log),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CachePlugin for DidUpdateRecorder {
    fn name(&self) -> &str {
        self.label
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks::NONE.with_cache_did_update()
    }

    async fn cache_did_update(&self, ctx: CacheDidUpdateContext<'_>) -> anyhow::Result<()> {
        self.log.lock().push(format!("did_update:{}", self.label));
        self.seen
            .lock()
            .push((ctx.old_response.map(body_str), body_str(ctx.new_response)));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Call counters shared by a [`RecordingStorage`] and its handles.
#[derive(Default)]
pub struct StoreCalls {
    pub opens: AtomicUsize,
    pub writes: AtomicUsize,
    pub reads: AtomicUsize,
}

impl StoreCalls {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

/// Counts every call, delegating to an [`InMemoryCacheStorage`].
pub struct RecordingStorage {
    pub inner: InMemoryCacheStorage,
    pub calls: Arc<StoreCalls>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self {
            inner: InMemoryCacheStorage::new(),
            calls: Arc::new(StoreCalls::default()),
        }
    }
}

#[async_trait]
impl CacheStorage for RecordingStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheHandle>, StoreError> {
        self.calls.opens.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.open(name).await?;
        Ok(Arc::new(RecordingHandle {
            inner,
            calls: Arc::clone(&self.calls),
        }))
    }

    async fn has(&self, name: &str) -> Result<bool, StoreError> {
        self.inner.has(name).await
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        self.inner.delete(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.inner.keys().await
    }
}

struct RecordingHandle {
    inner: Arc<dyn CacheHandle>,
    calls: Arc<StoreCalls>,
}

#[async_trait]
impl CacheHandle for RecordingHandle {
    async fn put(
        &self,
        request: &RequestDescriptor,
        response: &ResponseRecord,
        match_options: Option<&MatchOptions>,
    ) -> Result<(), StoreError> {
        self.calls.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put(request, response, match_options).await
    }

    async fn match_entry(
        &self,
        request: &RequestDescriptor,
        match_options: Option<&MatchOptions>,
    ) -> Result<Option<ResponseRecord>, StoreError> {
        self.calls.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.match_entry(request, match_options).await
    }

    async fn delete(
        &self,
        request: &RequestDescriptor,
        match_options: Option<&MatchOptions>,
    ) -> Result<bool, StoreError> {
        self.inner.delete(request, match_options).await
    }

    async fn keys(
        &self,
        request: Option<&RequestDescriptor>,
        match_options: Option<&MatchOptions>,
    ) -> Result<Vec<RequestDescriptor>, StoreError> {
        self.inner.keys(request, match_options).await
    }
}

/// Which error a [`FailingStorage`] write raises.
#[derive(Debug, Clone, Copy)]
pub enum WriteFailure {
    Quota,
    Backend,
}

/// Storage whose writes always fail with the configured error kind.
/// Reads find nothing.
pub struct FailingStorage {
    pub failure: WriteFailure,
}

#[async_trait]
impl CacheStorage for FailingStorage {
    async fn open(&self, _name: &str) -> Result<Arc<dyn CacheHandle>, StoreError> {
        Ok(Arc::new(FailingHandle {
            failure: self.failure,
        }))
    }

    async fn has(&self, _name: &str) -> Result<bool, StoreError> {
        Ok(true)
    }

    async fn delete(&self, _name: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }
}

struct FailingHandle {
    failure: WriteFailure,
}

#[async_trait]
impl CacheHandle for FailingHandle {
    async fn put(
        &self,
        _request: &RequestDescriptor,
        _response: &ResponseRecord,
        _match_options: Option<&MatchOptions>,
    ) -> Result<(), StoreError> {
        Err(match self.failure {
            WriteFailure::Quota => StoreError::QuotaExceeded {
                requested: 100,
                available: 0,
            },
            WriteFailure::Backend => StoreError::Backend(anyhow::anyhow!("disk unplugged")),
        })
    }

    async fn match_entry(
        &self,
        _request: &RequestDescriptor,
        _match_options: Option<&MatchOptions>,
    ) -> Result<Option<ResponseRecord>, StoreError> {
        Ok(None)
    }

    async fn delete(
        &self,
        _request: &RequestDescriptor,
        _match_options: Option<&MatchOptions>,
    ) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn keys(
        &self,
        _request: Option<&RequestDescriptor>,
        _match_options: Option<&MatchOptions>,
    ) -> Result<Vec<RequestDescriptor>, StoreError> {
        Ok(Vec::new())
    }
}

//! Plugin capability trait and hook contexts.
//!
//! A plugin implements any subset of three hooks and declares which ones via
//! [`CachePlugin::hooks`]. Plugins are passed per call as an ordered slice;
//! [`PluginChain`] runs each hook kind across that slice in order.
//!
//! - [`cacheable_response`]: status/header allow-list for writes
//! - [`broadcast_update`]: broadcasts overwrites whose content changed

pub mod broadcast_update;
pub mod cacheable_response;
mod chain;

use async_trait::async_trait;
use cachegate_core::{CacheName, Event, MatchOptions, RequestDescriptor, ResponseRecord};

pub use broadcast_update::{BroadcastUpdatePlugin, CacheUpdated};
pub use cacheable_response::CacheableResponsePlugin;
pub(crate) use chain::{PluginChain, WillUpdate};

/// Which hooks a plugin implements. Undeclared hooks are never called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginHooks {
    pub cache_will_update: bool,
    pub cache_did_update: bool,
    pub cached_response_will_be_used: bool,
}

impl PluginHooks {
    /// No hooks.
    pub const NONE: Self = Self {
        cache_will_update: false,
        cache_did_update: false,
        cached_response_will_be_used: false,
    };

    #[must_use]
    pub const fn with_cache_will_update(mut self) -> Self {
        self.cache_will_update = true;
        self
    }

    #[must_use]
    pub const fn with_cache_did_update(mut self) -> Self {
        self.cache_did_update = true;
        self
    }

    #[must_use]
    pub const fn with_cached_response_will_be_used(mut self) -> Self {
        self.cached_response_will_be_used = true;
        self
    }
}

/// Input to [`CachePlugin::cache_will_update`].
#[derive(Debug, Clone, Copy)]
pub struct CacheWillUpdateContext<'a> {
    pub cache_name: &'a CacheName,
    pub request: &'a RequestDescriptor,
    /// The response as left by the previous plugin in the chain.
    pub response: &'a ResponseRecord,
    pub event: Option<&'a Event>,
}

/// Input to [`CachePlugin::cache_did_update`].
#[derive(Debug, Clone, Copy)]
pub struct CacheDidUpdateContext<'a> {
    pub cache_name: &'a CacheName,
    pub request: &'a RequestDescriptor,
    /// The entry that was replaced, if one existed before the write.
    pub old_response: Option<&'a ResponseRecord>,
    pub new_response: &'a ResponseRecord,
    pub event: Option<&'a Event>,
}

/// Input to [`CachePlugin::cached_response_will_be_used`].
#[derive(Debug, Clone, Copy)]
pub struct CachedResponseWillBeUsedContext<'a> {
    pub cache_name: &'a CacheName,
    pub request: &'a RequestDescriptor,
    pub match_options: Option<&'a MatchOptions>,
    /// The stored response as left by the previous plugin in the chain.
    pub cached_response: &'a ResponseRecord,
    pub event: Option<&'a Event>,
}

/// Caller-supplied extension of the put and match pipelines.
///
/// Hooks receive shared references; to change the flowing response a hook
/// returns a new [`ResponseRecord`].
///
/// Used as `Arc<dyn CachePlugin>`.
#[async_trait]
pub trait CachePlugin: Send + Sync {
    /// Name used in logs and [`CacheError::Plugin`](crate::CacheError::Plugin).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The hooks this plugin implements.
    fn hooks(&self) -> PluginHooks;

    /// Write-path transform. Return the response to store (the given one or a
    /// replacement), or `None` to veto the write.
    async fn cache_will_update(
        &self,
        ctx: CacheWillUpdateContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        Ok(Some(ctx.response.clone()))
    }

    /// Write-path observer, called after the write succeeded. Errors are
    /// logged and otherwise ignored.
    async fn cache_did_update(&self, _ctx: CacheDidUpdateContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Read-path transform. Return a replacement, or `None` to pass the
    /// cached response through unchanged.
    async fn cached_response_will_be_used(
        &self,
        _ctx: CachedResponseWillBeUsedContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        Ok(None)
    }
}

//! Ordered execution of one hook kind across a plugin slice.

use std::sync::Arc;

use cachegate_core::{CacheName, Event, MatchOptions, RequestDescriptor, ResponseRecord};
use tracing::warn;

use super::{
    CacheDidUpdateContext, CachePlugin, CacheWillUpdateContext, CachedResponseWillBeUsedContext,
    PluginHooks,
};
use crate::error::CacheError;

/// Result of the write-transform chain.
#[derive(Debug)]
pub(crate) enum WillUpdate {
    /// Write this response.
    Store(ResponseRecord),
    /// The named plugin vetoed the write.
    Vetoed { plugin: String },
}

/// Runs hooks across the plugins supplied to a single call.
///
/// Hooks of one kind run strictly one after another in slice order; plugins
/// that do not declare a hook are skipped.
#[derive(Clone, Copy)]
pub(crate) struct PluginChain<'a> {
    plugins: &'a [Arc<dyn CachePlugin>],
}

impl<'a> PluginChain<'a> {
    pub fn new(plugins: &'a [Arc<dyn CachePlugin>]) -> Self {
        Self { plugins }
    }

    fn declaring(
        self,
        select: fn(&PluginHooks) -> bool,
    ) -> impl Iterator<Item = &'a Arc<dyn CachePlugin>> {
        self.plugins.iter().filter(move |p| select(&p.hooks()))
    }

    pub fn has_cache_will_update(self) -> bool {
        self.declaring(|h| h.cache_will_update).next().is_some()
    }

    pub fn has_cache_did_update(self) -> bool {
        self.declaring(|h| h.cache_did_update).next().is_some()
    }

    /// Threads `response` through every `cache_will_update` hook. Stops at
    /// the first veto.
    pub async fn cache_will_update(
        self,
        cache_name: &CacheName,
        request: &RequestDescriptor,
        response: ResponseRecord,
        event: Option<&Event>,
    ) -> Result<WillUpdate, CacheError> {
        let mut current = response;
        for plugin in self.declaring(|h| h.cache_will_update) {
            let ctx = CacheWillUpdateContext {
                cache_name,
                request,
                response: &current,
                event,
            };
            let outcome = plugin
                .cache_will_update(ctx)
                .await
                .map_err(|source| plugin_error(plugin, "cache_will_update", source))?;
            match outcome {
                Some(next) => current = next,
                None => {
                    return Ok(WillUpdate::Vetoed {
                        plugin: plugin.name().to_string(),
                    })
                }
            }
        }
        Ok(WillUpdate::Store(current))
    }

    /// Notifies every `cache_did_update` observer. Observer errors are logged
    /// and do not stop later observers.
    pub async fn cache_did_update(self, ctx: CacheDidUpdateContext<'_>) {
        for plugin in self.declaring(|h| h.cache_did_update) {
            if let Err(err) = plugin.cache_did_update(ctx).await {
                warn!(plugin = plugin.name(), error = %err, "cache_did_update hook failed");
            }
        }
    }

    /// Threads `cached` through every `cached_response_will_be_used` hook.
    pub async fn cached_response_will_be_used(
        self,
        cache_name: &CacheName,
        request: &RequestDescriptor,
        match_options: Option<&MatchOptions>,
        cached: ResponseRecord,
        event: Option<&Event>,
    ) -> Result<ResponseRecord, CacheError> {
        let mut current = cached;
        for plugin in self.declaring(|h| h.cached_response_will_be_used) {
            let ctx = CachedResponseWillBeUsedContext {
                cache_name,
                request,
                match_options,
                cached_response: &current,
                event,
            };
            let replacement = plugin
                .cached_response_will_be_used(ctx)
                .await
                .map_err(|source| plugin_error(plugin, "cached_response_will_be_used", source))?;
            if let Some(next) = replacement {
                current = next;
            }
        }
        Ok(current)
    }
}

fn plugin_error(
    plugin: &Arc<dyn CachePlugin>,
    hook: &'static str,
    source: anyhow::Error,
) -> CacheError {
    CacheError::Plugin {
        plugin: plugin.name().to_string(),
        hook,
        source,
    }
}

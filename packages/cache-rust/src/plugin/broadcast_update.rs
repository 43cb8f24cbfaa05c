//! Broadcasts cache overwrites whose content changed.

use async_trait::async_trait;
use cachegate_core::{CacheName, ResponseRecord};
use http::header::{CONTENT_LENGTH, ETAG, LAST_MODIFIED};
use http::HeaderName;
use tokio::sync::broadcast;

use super::{CacheDidUpdateContext, CachePlugin, PluginHooks};

/// Message sent when a cached entry was replaced by different content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheUpdated {
    pub cache_name: CacheName,
    pub url: String,
}

/// `cache_did_update` observer that publishes [`CacheUpdated`] on a
/// broadcast channel.
///
/// Old and new responses are compared on a fixed set of headers (by default
/// `content-length`, `etag`, `last-modified`). First writes never broadcast.
/// If neither response carries any of the headers, the pair is treated as
/// unchanged.
pub struct BroadcastUpdatePlugin {
    sender: broadcast::Sender<CacheUpdated>,
    headers_to_check: Vec<HeaderName>,
}

impl BroadcastUpdatePlugin {
    /// Creates the plugin with a channel buffering up to `capacity` messages
    /// per receiver.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            headers_to_check: vec![CONTENT_LENGTH, ETAG, LAST_MODIFIED],
        }
    }

    /// Replaces the compared header set.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<HeaderName>) -> Self {
        self.headers_to_check = headers;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheUpdated> {
        self.sender.subscribe()
    }

    fn responses_are_same(&self, first: &ResponseRecord, second: &ResponseRecord) -> bool {
        let comparable = self
            .headers_to_check
            .iter()
            .any(|h| first.header(h).is_some() && second.header(h).is_some());
        if !comparable {
            return true;
        }
        self.headers_to_check
            .iter()
            .all(|h| first.header(h) == second.header(h))
    }
}

#[async_trait]
impl CachePlugin for BroadcastUpdatePlugin {
    fn name(&self) -> &str {
        "broadcast-update"
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks::NONE.with_cache_did_update()
    }

    async fn cache_did_update(&self, ctx: CacheDidUpdateContext<'_>) -> anyhow::Result<()> {
        let Some(old) = ctx.old_response else {
            return Ok(());
        };
        if self.responses_are_same(old, ctx.new_response) {
            return Ok(());
        }

        let message = CacheUpdated {
            cache_name: ctx.cache_name.clone(),
            url: ctx.request.url().to_string(),
        };
        // No receivers is normal.
        if self.sender.send(message).is_err() {
            tracing::debug!(url = ctx.request.url(), "cache update had no subscribers");
        }
        Ok(())
    }
}

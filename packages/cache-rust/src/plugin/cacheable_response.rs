//! Allow-list plugin deciding which responses may be written.

use async_trait::async_trait;
use cachegate_core::ResponseRecord;
use http::{HeaderName, HeaderValue};

use super::{CachePlugin, CacheWillUpdateContext, PluginHooks};
use crate::error::PluginConfigError;

/// Stores a response only if its status is in `statuses` and every header in
/// `headers` carries the given value. Anything else is vetoed.
///
/// Declaring `cache_will_update` replaces the default cacheability policy,
/// so this plugin is also how a caller opts in to caching opaque (status `0`)
/// responses.
#[derive(Debug, Clone)]
pub struct CacheableResponsePlugin {
    statuses: Option<Vec<u16>>,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl CacheableResponsePlugin {
    /// # Errors
    ///
    /// Returns [`PluginConfigError::NoCriteria`] if neither statuses nor
    /// headers are given.
    pub fn new(
        statuses: Option<Vec<u16>>,
        headers: Vec<(HeaderName, HeaderValue)>,
    ) -> Result<Self, PluginConfigError> {
        if statuses.is_none() && headers.is_empty() {
            return Err(PluginConfigError::NoCriteria);
        }
        Ok(Self { statuses, headers })
    }

    /// Allow-list by status code only.
    #[must_use]
    pub fn for_statuses(statuses: impl Into<Vec<u16>>) -> Self {
        Self {
            statuses: Some(statuses.into()),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_cacheable(&self, response: &ResponseRecord) -> bool {
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&response.status()) {
                return false;
            }
        }
        self.headers
            .iter()
            .all(|(name, value)| response.header(name) == Some(value))
    }
}

#[async_trait]
impl CachePlugin for CacheableResponsePlugin {
    fn name(&self) -> &str {
        "cacheable-response"
    }

    fn hooks(&self) -> PluginHooks {
        PluginHooks::NONE.with_cache_will_update()
    }

    async fn cache_will_update(
        &self,
        ctx: CacheWillUpdateContext<'_>,
    ) -> anyhow::Result<Option<ResponseRecord>> {
        if self.is_cacheable(ctx.response) {
            Ok(Some(ctx.response.clone()))
        } else {
            tracing::debug!(
                plugin = self.name(),
                status = ctx.response.status(),
                url = ctx.request.url(),
                "response rejected by cacheable-response criteria"
            );
            Ok(None)
        }
    }
}

//! Read path.

use cachegate_core::{CacheName, RequestDescriptor, ResponseRecord};
use tracing::{info_span, Instrument};

use super::{CacheWrapper, CallOptions};
use crate::error::CacheError;
use crate::plugin::PluginChain;

impl CacheWrapper {
    /// Looks up `request` in the partition `cache_name`.
    ///
    /// A miss returns `Ok(None)` without running any hook. A hit is threaded
    /// through every `cached_response_will_be_used` hook in order; the last
    /// value is returned.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Storage`] if opening or reading the partition fails
    /// - [`CacheError::Plugin`] if a `cached_response_will_be_used` hook fails
    pub async fn match_request(
        &self,
        cache_name: &CacheName,
        request: &RequestDescriptor,
        opts: &CallOptions<'_>,
    ) -> Result<Option<ResponseRecord>, CacheError> {
        let span = info_span!(
            "cache_match",
            cache = %cache_name,
            url = request.url(),
            outcome = tracing::field::Empty,
        );

        let result = self
            .match_inner(cache_name, request, opts)
            .instrument(span.clone())
            .await;

        let outcome = match &result {
            Ok(Some(_)) => "hit",
            Ok(None) => "miss",
            Err(_) => "error",
        };
        span.record("outcome", outcome);
        metrics::counter!("cachegate_match_total", "outcome" => outcome).increment(1);

        result
    }

    async fn match_inner(
        &self,
        cache_name: &CacheName,
        request: &RequestDescriptor,
        opts: &CallOptions<'_>,
    ) -> Result<Option<ResponseRecord>, CacheError> {
        let cache = self.storage.open(cache_name.as_str()).await?;
        let Some(cached) = cache.match_entry(request, opts.match_options).await? else {
            return Ok(None);
        };

        let response = PluginChain::new(opts.plugins)
            .cached_response_will_be_used(
                cache_name,
                request,
                opts.match_options,
                cached,
                opts.event,
            )
            .await?;
        Ok(Some(response))
    }
}

//! Write path.

use cachegate_core::{is_cacheable_by_default, CacheName, RequestDescriptor, ResponseRecord};
use tracing::{debug, info_span, warn, Instrument};

use super::{CacheWrapper, CallOptions, PutOutcome, SkipReason};
use crate::error::CacheError;
use crate::plugin::{CacheDidUpdateContext, PluginChain, WillUpdate};

impl CacheWrapper {
    /// Writes `response` for `request` into the partition `cache_name`.
    ///
    /// 1. Non-`GET` requests fail before any I/O.
    /// 2. Without a `cache_will_update` plugin, opaque (`0`) and partial
    ///    (`206`) responses are skipped; with one, the plugins decide.
    /// 3. `cache_will_update` hooks transform or veto the response in order.
    /// 4. If any plugin declares `cache_did_update`, the current entry is
    ///    read first so observers see the replaced value.
    /// 5. The response is written. On storage exhaustion every quota
    ///    subscriber runs before the error is returned.
    /// 6. `cache_did_update` observers run in order.
    ///
    /// # Errors
    ///
    /// - [`CacheError::NonGetRequest`] for non-`GET` requests
    /// - [`CacheError::Plugin`] if a `cache_will_update` hook fails
    /// - [`CacheError::Storage`] with the store's error, unchanged
    pub async fn put(
        &self,
        cache_name: &CacheName,
        request: &RequestDescriptor,
        response: ResponseRecord,
        opts: &CallOptions<'_>,
    ) -> Result<PutOutcome, CacheError> {
        let span = info_span!(
            "cache_put",
            cache = %cache_name,
            url = request.url(),
            outcome = tracing::field::Empty,
        );

        let result = self
            .put_inner(cache_name, request, response, opts)
            .instrument(span.clone())
            .await;

        let outcome = match &result {
            Ok(PutOutcome::Stored) => "stored",
            Ok(PutOutcome::Skipped(_)) => "skipped",
            Err(_) => "error",
        };
        span.record("outcome", outcome);
        metrics::counter!("cachegate_put_total", "outcome" => outcome).increment(1);

        result
    }

    async fn put_inner(
        &self,
        cache_name: &CacheName,
        request: &RequestDescriptor,
        response: ResponseRecord,
        opts: &CallOptions<'_>,
    ) -> Result<PutOutcome, CacheError> {
        if !request.is_get() {
            return Err(CacheError::NonGetRequest {
                method: request.method().clone(),
                url: request.url().to_string(),
            });
        }

        let chain = PluginChain::new(opts.plugins);

        let response = if chain.has_cache_will_update() {
            match chain
                .cache_will_update(cache_name, request, response, opts.event)
                .await?
            {
                WillUpdate::Store(response) => response,
                WillUpdate::Vetoed { plugin } => {
                    debug!(plugin = %plugin, "write vetoed by plugin");
                    return Ok(PutOutcome::Skipped(SkipReason::Vetoed { plugin }));
                }
            }
        } else if is_cacheable_by_default(&response) {
            response
        } else {
            let status = response.status();
            debug!(status, "response not cacheable by default; skipping write");
            return Ok(PutOutcome::Skipped(SkipReason::NotCacheable { status }));
        };

        let cache = self.storage.open(cache_name.as_str()).await?;

        let old_response = if chain.has_cache_did_update() {
            cache.match_entry(request, opts.match_options).await?
        } else {
            None
        };

        if let Err(err) = cache.put(request, &response, opts.match_options).await {
            if err.is_quota_exceeded() {
                warn!(error = %err, "storage quota exceeded; notifying quota error subscribers");
                metrics::counter!("cachegate_quota_exceeded_total").increment(1);
                self.quota_registry.notify_all();
            }
            return Err(err.into());
        }

        chain
            .cache_did_update(CacheDidUpdateContext {
                cache_name,
                request,
                old_response: old_response.as_ref(),
                new_response: &response,
                event: opts.event,
            })
            .await;

        Ok(PutOutcome::Stored)
    }
}

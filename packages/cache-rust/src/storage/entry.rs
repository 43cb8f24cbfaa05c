//! Stored entries and Cache-API style request matching.

use cachegate_core::{MatchOptions, RequestDescriptor, ResponseRecord};
use http::header::VARY;
use http::{HeaderMap, HeaderName, Method};

/// A request/response pair plus its accounted size in bytes.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    pub request: RequestDescriptor,
    pub response: ResponseRecord,
    pub cost: u64,
}

impl CacheEntry {
    pub fn new(request: RequestDescriptor, response: ResponseRecord) -> Self {
        let cost = entry_cost(&request, &response);
        Self {
            request,
            response,
            cost,
        }
    }

    /// Whether an incoming `request` selects this entry.
    ///
    /// - Unless `ignore_method`, only `GET` and `HEAD` requests match.
    /// - URLs compare without their fragment, and without their query when
    ///   `ignore_search` is set.
    /// - Unless `ignore_vary`, every header named by the stored response's
    ///   `Vary` must carry the same values, in order, on both requests. `Vary: *` never
    ///   matches.
    pub fn matches(&self, request: &RequestDescriptor, options: &MatchOptions) -> bool {
        if !options.ignore_method && !matches!(*request.method(), Method::GET | Method::HEAD) {
            return false;
        }
        if comparable_url(self.request.url(), options.ignore_search)
            != comparable_url(request.url(), options.ignore_search)
        {
            return false;
        }
        options.ignore_vary
            || vary_matches(
                self.response.headers(),
                self.request.headers(),
                request.headers(),
            )
    }
}

/// Strips the fragment, and the query string when `ignore_search` is set.
fn comparable_url(url: &str, ignore_search: bool) -> &str {
    let url = url.split_once('#').map_or(url, |(base, _)| base);
    if ignore_search {
        url.split_once('?').map_or(url, |(base, _)| base)
    } else {
        url
    }
}

fn vary_matches(response: &HeaderMap, stored: &HeaderMap, incoming: &HeaderMap) -> bool {
    for value in response.get_all(VARY) {
        let Ok(value) = value.to_str() else {
            return false;
        };
        for field in value.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            if field == "*" {
                return false;
            }
            let Ok(name) = HeaderName::from_bytes(field.as_bytes()) else {
                return false;
            };
            if !stored.get_all(&name).iter().eq(incoming.get_all(&name)) {
                return false;
            }
        }
    }
    true
}

fn entry_cost(request: &RequestDescriptor, response: &ResponseRecord) -> u64 {
    let header_bytes: usize = response
        .headers()
        .iter()
        .map(|(name, value)| name.as_str().len() + value.len())
        .sum();
    let total = request.url().len() + header_bytes + response.body().len();
    u64::try_from(total).unwrap_or(u64::MAX)
}

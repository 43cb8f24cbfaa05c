//! Default cacheability policy.
//!
//! Applied by the put pipeline only when no plugin takes over the decision.

use crate::response::ResponseRecord;

/// Status reported for opaque (cross-origin, uninspectable) responses.
pub const OPAQUE_STATUS: u16 = 0;

/// HTTP 206 Partial Content.
pub const PARTIAL_CONTENT_STATUS: u16 = 206;

/// Returns `false` for opaque and partial responses, `true` for everything
/// else. Error statuses are deliberately left to plugins.
#[must_use]
pub fn is_cacheable_by_default(response: &ResponseRecord) -> bool {
    !matches!(response.status(), OPAQUE_STATUS | PARTIAL_CONTENT_STATUS)
}

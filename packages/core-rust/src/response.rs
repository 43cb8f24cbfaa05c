//! Immutable response records.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::policy::OPAQUE_STATUS;

/// A cached (or cacheable) response: status, headers, and body.
///
/// Records are immutable. The `with_*` methods derive a new record and leave
/// the original untouched, so a plugin handed `&ResponseRecord` can only
/// replace the value flowing through a pipeline, never edit it.
///
/// The status is a raw `u16` rather than `http::StatusCode` because the
/// opaque-response sentinel `0` is not a valid HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl ResponseRecord {
    /// Creates a record with the given status and body and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Creates an opaque response (status `0`, empty body): the result of a
    /// cross-origin request whose contents cannot be inspected.
    #[must_use]
    pub fn opaque() -> Self {
        Self::new(OPAQUE_STATUS, Bytes::new())
    }

    /// Derives a record with a different status.
    #[must_use]
    pub fn with_status(&self, status: u16) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Derives a record with `name` set to `value`.
    #[must_use]
    pub fn with_header(&self, name: HeaderName, value: HeaderValue) -> Self {
        let mut headers = self.headers.clone();
        headers.insert(name, value);
        Self {
            headers,
            ..self.clone()
        }
    }

    /// Derives a record with a different body.
    #[must_use]
    pub fn with_body(&self, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.status == OPAQUE_STATUS
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

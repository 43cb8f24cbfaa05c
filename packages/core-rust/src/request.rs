//! Request descriptors: the keys of the response store.

use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Identifies a cacheable operation by HTTP method, URL, and request headers.
///
/// Headers matter only for `Vary`-aware lookups; two descriptors with the
/// same method and URL address the same entry otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    headers: HeaderMap,
}

impl RequestDescriptor {
    /// Creates a descriptor with no headers.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Shorthand for a `GET` descriptor.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Returns the descriptor with `name` set to `value`, replacing any
    /// previous value for that header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the descriptor with `value` added to any existing values of
    /// `name`.
    #[must_use]
    pub fn with_appended_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether this descriptor may be written to the store.
    #[must_use]
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}

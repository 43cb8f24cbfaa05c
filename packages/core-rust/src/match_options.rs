//! Lookup refinements forwarded verbatim to the store.

use serde::{Deserialize, Serialize};

/// Options that loosen how a stored entry is matched against a request.
///
/// The pipeline never reads these; only store implementations do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchOptions {
    /// Ignore the query string of both the stored and the incoming URL.
    pub ignore_search: bool,
    /// Match regardless of the incoming request's method.
    pub ignore_method: bool,
    /// Ignore the stored response's `Vary` header.
    pub ignore_vary: bool,
}

impl MatchOptions {
    #[must_use]
    pub fn ignore_search() -> Self {
        Self {
            ignore_search: true,
            ..Self::default()
        }
    }
}

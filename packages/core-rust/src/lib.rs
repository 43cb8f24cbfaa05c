//! `cachegate` core: request/response value types, match options, and the
//! default cacheability policy shared by every cache layer.

pub mod match_options;
pub mod policy;
pub mod request;
pub mod response;
pub mod types;

pub use match_options::MatchOptions;
pub use policy::{is_cacheable_by_default, OPAQUE_STATUS, PARTIAL_CONTENT_STATUS};
pub use request::RequestDescriptor;
pub use response::ResponseRecord;
pub use types::{CacheName, Event};

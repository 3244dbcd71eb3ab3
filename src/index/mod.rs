//! Duplicate URL detection.
//!
//! URLs are compared after [`normalize_url`]; the [`UrlIndex`] persists the
//! normalized set so the add and import tools can reject duplicates without
//! re-reading the whole catalog.

pub mod normalize;
pub mod url_index;

pub use normalize::{normalize_url, url_host};
pub use url_index::{
    find_duplicates, DuplicateGroup, IndexEntry, IndexStats, SimilarUrl, UrlIndex, INDEX_VERSION,
};

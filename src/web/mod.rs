//! Web Page Cache Module
//!
//! Fetches pages over HTTP and keeps their bodies in the key-value store for
//! a short time, counting every request per URL.

mod fetcher;
mod page_cache;

pub use fetcher::{HttpFetcher, PageFetcher};
pub use page_cache::{count_key, page_key, PageCache};

/// Seconds a fetched page body stays cached.
pub const DEFAULT_PAGE_TTL: u64 = 10;

//! Page Cache Module
//!
//! TTL cache of page bodies keyed by URL, with an access counter per URL.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{decode_int, decode_utf8};
use crate::error::Result;
use crate::store::KeyValueStore;
use crate::web::{PageFetcher, DEFAULT_PAGE_TTL};

/// Store key of the access counter for `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{}", url)
}

/// Store key of the cached body for `url`.
pub fn page_key(url: &str) -> String {
    format!("html:{}", url)
}

// == Page Cache ==
/// Serves page bodies from the store, fetching them on a miss.
pub struct PageCache<F> {
    store: Arc<dyn KeyValueStore>,
    fetcher: F,
    ttl: u64,
}

impl<F: PageFetcher> PageCache<F> {
    /// Creates a cache with the default expiration.
    pub fn new(store: Arc<dyn KeyValueStore>, fetcher: F) -> Self {
        Self::with_ttl(store, fetcher, DEFAULT_PAGE_TTL)
    }

    /// Creates a cache whose entries expire after `ttl` seconds.
    pub fn with_ttl(store: Arc<dyn KeyValueStore>, fetcher: F, ttl: u64) -> Self {
        Self { store, fetcher, ttl }
    }

    /// Expiration applied to fetched pages, in seconds.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    // == Get Page ==
    /// Returns the body of `url`, from the store when cached.
    ///
    /// The access counter is incremented on every call, hit or miss. An
    /// empty cached body is treated as a miss.
    ///
    /// # Arguments
    /// * `url` - Page address, used verbatim as part of the store keys
    ///
    /// # Returns
    /// - `Ok(body)` from the store or, on a miss, from the fetcher
    /// - `Err` if the store or the fetch fails; the counter is already bumped
    pub async fn get_page(&self, url: &str) -> Result<String> {
        let count = self.store.incr(&count_key(url)).await?;
        let key = page_key(url);

        if let Some(cached) = self.store.get(&key).await? {
            if !cached.is_empty() {
                debug!("Page cache hit for {} (access #{})", url, count);
                return decode_utf8(cached);
            }
        }

        info!("Page cache miss for {}, fetching", url);
        let body = self.fetcher.fetch(url).await?;
        self.store.set_ex(&key, body.as_bytes(), self.ttl).await?;

        Ok(body)
    }

    // == Access Count ==
    /// Number of times `url` has been requested, 0 if never.
    pub async fn access_count(&self, url: &str) -> Result<i64> {
        match self.store.get(&count_key(url)).await? {
            Some(bytes) => decode_int(bytes),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fetcher returning a fixed body and counting network requests
    #[derive(Clone, Default)]
    struct CountingFetcher {
        requests: Arc<AtomicUsize>,
        body: String,
    }

    impl CountingFetcher {
        fn returning(body: &str) -> Self {
            Self {
                requests: Arc::new(AtomicUsize::new(0)),
                body: body.to_string(),
            }
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            Err(StoreError::Decode(format!("cannot fetch {}", url)))
        }
    }

    const URL: &str = "http://example.com/";

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let fetcher = CountingFetcher::returning("<html>hi</html>");
        let cache = PageCache::new(Arc::new(MemoryStore::new()), fetcher.clone());

        assert_eq!(cache.get_page(URL).await.unwrap(), "<html>hi</html>");
        assert_eq!(cache.get_page(URL).await.unwrap(), "<html>hi</html>");

        assert_eq!(fetcher.requests(), 1);
        assert_eq!(cache.access_count(URL).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_page_stored_with_ttl() {
        let store = Arc::new(MemoryStore::new());
        let cache = PageCache::new(store.clone(), CountingFetcher::returning("body"));

        cache.get_page(URL).await.unwrap();

        assert_eq!(cache.ttl(), 10);
        assert_eq!(store.get("html:http://example.com/").await.unwrap(), Some(b"body".to_vec()));
        assert_eq!(store.get("count:http://example.com/").await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_expired_page_is_refetched() {
        let fetcher = CountingFetcher::returning("body");
        let cache = PageCache::with_ttl(Arc::new(MemoryStore::new()), fetcher.clone(), 1);

        cache.get_page(URL).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        cache.get_page(URL).await.unwrap();

        assert_eq!(fetcher.requests(), 2);
        assert_eq!(cache.access_count(URL).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_body_is_not_a_hit() {
        let fetcher = CountingFetcher::returning("");
        let cache = PageCache::new(Arc::new(MemoryStore::new()), fetcher.clone());

        cache.get_page(URL).await.unwrap();
        cache.get_page(URL).await.unwrap();

        assert_eq!(fetcher.requests(), 2);
    }

    #[tokio::test]
    async fn test_urls_are_counted_separately() {
        let cache = PageCache::new(Arc::new(MemoryStore::new()), CountingFetcher::returning("x"));

        cache.get_page("http://a.test/").await.unwrap();
        cache.get_page("http://a.test/").await.unwrap();
        cache.get_page("http://b.test/").await.unwrap();

        assert_eq!(cache.access_count("http://a.test/").await.unwrap(), 2);
        assert_eq!(cache.access_count("http://b.test/").await.unwrap(), 1);
        assert_eq!(cache.access_count("http://c.test/").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_after_counting() {
        let store = Arc::new(MemoryStore::new());
        let cache = PageCache::new(store.clone(), FailingFetcher);

        assert!(cache.get_page(URL).await.is_err());
        assert_eq!(cache.access_count(URL).await.unwrap(), 1);
        assert_eq!(store.get("html:http://example.com/").await.unwrap(), None);
    }

    #[test]
    fn test_keys() {
        assert_eq!(count_key("http://x/"), "count:http://x/");
        assert_eq!(page_key("http://x/"), "html:http://x/");
    }
}

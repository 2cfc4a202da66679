//! Cache Wrapper Module
//!
//! Stores values under generated keys and reads them back, with the store
//! operation counted and logged.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{BoundOperation, CacheValue, CallHistory, CountCalls, Instrumented};
use crate::error::{Result, StoreError};
use crate::store::KeyValueStore;

/// Qualified name of the instrumented store operation.
pub const STORE_OPERATION: &str = "Cache.store";

// == Cache ==
/// Wrapper around a key-value store handle.
///
/// The wrapper holds no state besides the handle: counters and history live
/// in the store, so they are visible to other processes.
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    store_op: Instrumented,
}

impl Cache {
    // == Constructor ==
    /// Wraps `store` without touching its contents.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            store_op: Instrumented::new(STORE_OPERATION)
                .with_hook(CountCalls)
                .with_hook(CallHistory),
        }
    }

    /// Wraps `store` and flushes it, discarding every existing key.
    pub async fn flushed(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let cache = Self::new(store);
        cache.reset().await?;
        Ok(cache)
    }

    // == Reset ==
    /// Flushes the whole store, including counters and history.
    pub async fn reset(&self) -> Result<()> {
        self.store.flush().await?;
        info!("Cache store flushed");
        Ok(())
    }

    // == Store ==
    /// Writes `value` under a fresh random key and returns the key.
    ///
    /// The call is counted and its argument and key are appended to the
    /// history logs.
    ///
    /// # Arguments
    /// * `value` - Text, bytes, integer or float to store
    ///
    /// # Returns
    /// - `Ok(key)` with the generated UUID key
    /// - `Err` if any store command fails
    pub async fn store(&self, value: impl Into<CacheValue>) -> Result<String> {
        let value = value.into();
        let args = value.repr_args();

        self.store_op
            .invoke(self.store.as_ref(), &args, || async {
                let key = Uuid::new_v4().to_string();
                self.store.set(&key, &value.to_bytes()).await?;
                Ok(key)
            })
            .await
    }

    // == Get ==
    /// Reads the raw bytes under `key`; `None` when the key is absent.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.store.get(key).await?;
        debug!("get {} -> {}", key, if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    /// Reads `key` and converts the bytes with `transform` when present.
    ///
    /// # Arguments
    /// * `key` - The key to read
    /// * `transform` - Conversion applied to the stored bytes
    ///
    /// # Returns
    /// - `Ok(None)` if the key is absent; `transform` is not called
    /// - `Ok(Some(value))` with the converted value
    /// - `Err` if the read or the conversion fails
    pub async fn get_with<T, F>(&self, key: &str, transform: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        self.get(key).await?.map(transform).transpose()
    }

    /// Reads `key` as UTF-8 text.
    pub async fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.get_with(key, decode_utf8).await
    }

    /// Reads `key` as a decimal integer.
    ///
    /// # Returns
    /// - `Ok(None)` if the key is absent
    /// - `Err(StoreError::Decode)` if the bytes are not an integer
    pub async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.get_with(key, decode_int).await
    }

    // == Tracked Operations ==
    /// Handle on the instrumented store operation, for replay and counts.
    pub fn store_operation(&self) -> BoundOperation<'_> {
        BoundOperation::new(&self.store_op, self.store.as_ref())
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("store_op", &self.store_op).finish()
    }
}

/// Decodes stored bytes as UTF-8 text.
pub fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Parses stored bytes as a decimal integer, ignoring surrounding whitespace.
pub fn decode_int(bytes: Vec<u8>) -> Result<i64> {
    let text = decode_utf8(bytes)?;
    text.trim()
        .parse()
        .map_err(|_| StoreError::Decode(format!("invalid integer literal: {:?}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn create_test_cache() -> (Cache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Cache::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_store_returns_uuid_key() {
        let (cache, _) = create_test_cache();

        let key = cache.store("hello").await.unwrap();
        assert!(Uuid::parse_str(&key).is_ok());
        assert_ne!(key, cache.store("hello").await.unwrap());
    }

    #[tokio::test]
    async fn test_store_and_get_each_type() {
        let (cache, _) = create_test_cache();

        let text = cache.store("foo").await.unwrap();
        let bytes = cache.store(b"bar".as_slice()).await.unwrap();
        let int = cache.store(123).await.unwrap();
        let float = cache.store(1.5).await.unwrap();

        assert_eq!(cache.get(&text).await.unwrap(), Some(b"foo".to_vec()));
        assert_eq!(cache.get(&bytes).await.unwrap(), Some(b"bar".to_vec()));
        assert_eq!(cache.get_int(&int).await.unwrap(), Some(123));
        assert_eq!(cache.get_str(&float).await.unwrap(), Some("1.5".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let (cache, _) = create_test_cache();

        assert_eq!(cache.get("missing").await.unwrap(), None);
        assert_eq!(cache.get_str("missing").await.unwrap(), None);
        assert_eq!(cache.get_int("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_with_custom_transform() {
        let (cache, _) = create_test_cache();

        let key = cache.store("abc").await.unwrap();
        let len = cache.get_with(&key, |bytes| Ok(bytes.len())).await.unwrap();
        assert_eq!(len, Some(3));
    }

    #[tokio::test]
    async fn test_get_int_rejects_text() {
        let (cache, _) = create_test_cache();

        let key = cache.store("not a number").await.unwrap();
        assert!(matches!(cache.get_int(&key).await, Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn test_get_str_rejects_invalid_utf8() {
        let (cache, _) = create_test_cache();

        let key = cache.store(vec![0xffu8, 0xfe]).await.unwrap();
        assert!(matches!(cache.get_str(&key).await, Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn test_store_counts_and_logs() {
        let (cache, store) = create_test_cache();

        let first = cache.store("a").await.unwrap();
        let second = cache.store(2).await.unwrap();

        assert_eq!(store.get(STORE_OPERATION).await.unwrap(), Some(b"2".to_vec()));
        assert_eq!(
            store.lrange("Cache.store:inputs", 0, -1).await.unwrap(),
            vec![b"('a',)".to_vec(), b"(2,)".to_vec()]
        );
        assert_eq!(
            store.lrange("Cache.store:outputs", 0, -1).await.unwrap(),
            vec![first.into_bytes(), second.into_bytes()]
        );
    }

    #[tokio::test]
    async fn test_new_does_not_flush() {
        let store = Arc::new(MemoryStore::new());
        store.set("existing", b"kept").await.unwrap();

        let cache = Cache::new(store.clone());
        assert_eq!(cache.get("existing").await.unwrap(), Some(b"kept".to_vec()));
    }

    #[tokio::test]
    async fn test_flushed_clears_store() {
        let store = Arc::new(MemoryStore::new());
        store.set("existing", b"gone").await.unwrap();

        let cache = Cache::flushed(store.clone()).await.unwrap();
        assert_eq!(cache.get("existing").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_decode_int() {
        assert_eq!(decode_int(b" 42\n".to_vec()).unwrap(), 42);
        assert_eq!(decode_int(b"-3".to_vec()).unwrap(), -3);
        assert!(decode_int(b"3.5".to_vec()).is_err());
    }
}

//! In-Memory Store Module
//!
//! HashMap-backed implementation of the key-value command set, used when no
//! Redis server is available and throughout the tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::{KeyValueStore, StoreEntry, StoredValue};

// == Memory Store ==
/// Key-value store kept in process memory.
///
/// Expired entries are invisible to every command and removed lazily on
/// access, or in bulk through [`MemoryStore::cleanup_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    /// Returns the number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|entry| !entry.is_expired()).count()
    }

    // == Is Empty ==
    /// Returns true if no live keys remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }
}

/// Looks up a live entry, dropping it first if it has expired.
fn live_entry<'a>(
    entries: &'a mut HashMap<String, StoreEntry>,
    key: &str,
) -> Option<&'a mut StoreEntry> {
    if entries.get(key).is_some_and(StoreEntry::is_expired) {
        entries.remove(key);
        return None;
    }
    entries.get_mut(key)
}

/// Resolves LRANGE indices against a list length.
fn range_bounds(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start >= len || start > stop {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key) {
            Some(entry) => Ok(Some(entry.as_bytes(key)?.to_vec())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoreEntry::new(StoredValue::Bytes(value.to_vec()), None),
        );
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoreEntry::new(StoredValue::Bytes(value.to_vec()), Some(ttl_secs)),
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.write().await;

        if let Some(entry) = live_entry(&mut entries, key) {
            let next = entry.as_integer(key)?.checked_add(1).ok_or_else(|| {
                StoreError::Decode(format!("increment or decrement would overflow: {}", key))
            })?;
            // Expiry survives an increment
            entry.value = StoredValue::Bytes(next.to_string().into_bytes());
            return Ok(next);
        }

        entries.insert(
            key.to_string(),
            StoreEntry::new(StoredValue::Bytes(b"1".to_vec()), None),
        );
        Ok(1)
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        let mut entries = self.entries.write().await;

        if let Some(entry) = live_entry(&mut entries, key) {
            let list = entry.as_list_mut(key)?;
            list.push_back(value.to_vec());
            return Ok(list.len());
        }

        let list = VecDeque::from([value.to_vec()]);
        entries.insert(key.to_string(), StoreEntry::new(StoredValue::List(list), None));
        Ok(1)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        let Some(entry) = live_entry(&mut entries, key) else {
            return Ok(Vec::new());
        };

        let list = entry.as_list_mut(key)?;
        match range_bounds(list.len(), start, stop) {
            Some((from, to)) => Ok(list.range(from..=to).cloned().collect()),
            None => Ok(Vec::new()),
        }
    }

    async fn flush(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        debug!("Flushed {} keys from memory store", removed);
        Ok(())
    }
}

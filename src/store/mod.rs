//! Key-Value Store Module
//!
//! The narrow command set the cache wrapper and the page cache need from a
//! key-value store, with a Redis backend and an in-memory backend.

mod entry;
mod memory;
mod redis_store;

pub use entry::{current_timestamp_ms, StoreEntry, StoredValue};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;

use crate::error::Result;

// == Key-Value Store ==
/// String-keyed commands against a key-value store.
///
/// Each method maps onto one native command. Absent keys are `None` or an
/// empty list, never an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// GET: raw bytes stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// SET: stores `value`, dropping any expiration on the key
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// SETEX: stores `value` expiring after `ttl_secs` seconds
    async fn set_ex(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()>;

    /// INCR: increments the integer under `key` (missing counts as 0)
    async fn incr(&self, key: &str) -> Result<i64>;

    /// RPUSH: appends to the list under `key`, returning the new length
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize>;

    /// LRANGE: inclusive range, negative indices count from the end
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// FLUSHDB: removes every key
    async fn flush(&self) -> Result<()>;
}

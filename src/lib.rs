//! NoSQL Basics - helpers around a document database and a key-value cache
//!
//! Provides a Redis-backed cache wrapper with call tracking and replay, a
//! TTL page cache, and MongoDB collection helpers.

pub mod cache;
pub mod config;
pub mod documents;
pub mod error;
pub mod store;
pub mod web;

pub use cache::{replay, Cache, CacheValue};
pub use config::Config;
pub use error::{Result, StoreError};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
pub use web::{HttpFetcher, PageCache};

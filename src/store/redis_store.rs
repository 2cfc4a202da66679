//! Redis Store Module
//!
//! Forwards each command to a Redis server over a managed connection.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::Result;
use crate::store::KeyValueStore;

// == Redis Store ==
/// Key-value store backed by a Redis server.
///
/// Cloning is cheap; clones share the underlying multiplexed connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    // == Constructor ==
    /// Opens a managed connection to the server at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        info!("Connected to Redis at {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        debug!("GET {}", key);
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        debug!("SET {}", key);
        let mut conn = self.conn.clone();
        let () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()> {
        debug!("SETEX {} {}", key, ttl_secs);
        let mut conn = self.conn.clone();
        let () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        debug!("INCR {}", key);
        let mut conn = self.conn.clone();
        Ok(conn.incr(key, 1i64).await?)
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        debug!("RPUSH {}", key);
        let mut conn = self.conn.clone();
        Ok(conn.rpush(key, value).await?)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        debug!("LRANGE {} {} {}", key, start, stop);
        let mut conn = self.conn.clone();
        Ok(conn.lrange(key, start, stop).await?)
    }

    async fn flush(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let () = redis::cmd("FLUSHDB").arg("ASYNC").query_async(&mut conn).await?;
        info!("Flushed Redis database");
        Ok(())
    }
}

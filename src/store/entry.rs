//! Store Entry Module
//!
//! Defines the structure for in-memory entries with TTL support.

use std::collections::VecDeque;

use chrono::Utc;

use crate::error::{Result, StoreError};

// == Stored Value ==
/// The two shapes of value the command set reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Plain string value (also holds counters as decimal text)
    Bytes(Vec<u8>),
    /// Ordered list of values
    List(VecDeque<Vec<u8>>),
}

// == Store Entry ==
/// A single in-memory entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored value
    pub value: StoredValue,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL in seconds.
    pub fn new(value: StoredValue, ttl_seconds: Option<u64>) -> Self {
        let expires_at =
            ttl_seconds.map(|ttl| current_timestamp_ms().saturating_add(ttl.saturating_mul(1000)));
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    /// Borrows the string value, failing for lists.
    pub fn as_bytes(&self, key: &str) -> Result<&[u8]> {
        match &self.value {
            StoredValue::Bytes(bytes) => Ok(bytes),
            StoredValue::List(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    /// Mutably borrows the list value, failing for strings.
    pub fn as_list_mut(&mut self, key: &str) -> Result<&mut VecDeque<Vec<u8>>> {
        match &mut self.value {
            StoredValue::List(list) => Ok(list),
            StoredValue::Bytes(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    /// Parses the string value as a decimal integer.
    pub fn as_integer(&self, key: &str) -> Result<i64> {
        let bytes = self.as_bytes(key)?;
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| StoreError::Decode(format!("value is not an integer: {}", key)))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

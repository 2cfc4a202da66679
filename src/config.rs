//! Configuration Module
//!
//! Handles loading connection settings from environment variables.

use std::env;

use crate::web::DEFAULT_PAGE_TTL;

/// Connection and cache parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL
    pub redis_url: String,
    /// MongoDB connection URL
    pub mongo_url: String,
    /// Database holding the school and student collections
    pub mongo_database: String,
    /// Database holding the nginx log collection
    pub logs_database: String,
    /// Expiration in seconds for cached pages
    pub page_ttl: u64,
    /// Whether the cache wrapper clears the key-value store when created
    pub flush_on_start: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379/)
    /// - `MONGO_URL` - MongoDB URL (default: mongodb://127.0.0.1:27017)
    /// - `MONGO_DATABASE` - School/student database (default: my_db)
    /// - `LOGS_DATABASE` - Nginx log database (default: logs)
    /// - `PAGE_TTL` - Page cache expiration in seconds (default: 10)
    /// - `FLUSH_ON_START` - Flush the store before caching (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            mongo_url: env::var("MONGO_URL").unwrap_or(defaults.mongo_url),
            mongo_database: env::var("MONGO_DATABASE").unwrap_or(defaults.mongo_database),
            logs_database: env::var("LOGS_DATABASE").unwrap_or(defaults.logs_database),
            page_ttl: env::var("PAGE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.page_ttl),
            flush_on_start: env::var("FLUSH_ON_START")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.flush_on_start),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379/".to_string(),
            mongo_url: "mongodb://127.0.0.1:27017".to_string(),
            mongo_database: "my_db".to_string(),
            logs_database: "logs".to_string(),
            page_ttl: DEFAULT_PAGE_TTL,
            flush_on_start: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Page Fetcher Module
//!
//! Network access for the page cache.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

// == Page Fetcher ==
/// Retrieves the body of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

// == HTTP Fetcher ==
/// Plain HTTP GET with no extra headers, auth or retries.
///
/// The status code is not inspected; error pages are returned like any
/// other body. Transport failures propagate.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        debug!("GET {} -> {}", url, response.status());
        Ok(response.text().await?)
    }
}

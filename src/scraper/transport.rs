//! HTTP transport seam for the scraper.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ScrapeError;

/// Minimal page-fetching interface, kept narrow so tests can script
/// responses without a network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a URL and return the response body on a success status.
    async fn get(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

//! Page Fetcher
//!
//! Issues one GET per catalog page and decodes the JSON envelope. A fetcher is shared
//! by every ingestion task; the underlying `reqwest::Client` pools connections.

use super::types::{FetchError, IngestionTask, PageEnvelope};
use crate::storage::types::CatalogItem;

use reqwest::Url;
use std::time::Duration;

pub struct PageFetcher {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, timeout)
    }

    pub fn with_client(http_client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// `<base>/audiobooks/?limit={page_size}&page={page}`
    pub fn page_url(&self, page: u32, page_size: u32) -> String {
        format!(
            "{}/audiobooks/?limit={}&page={}",
            self.base_url, page_size, page
        )
    }

    /// Total catalog size, read from a one-item probe of the first page.
    pub async fn verification_count(&self) -> Result<u64, FetchError> {
        let envelope = self.fetch_envelope(&self.page_url(1, 1)).await?;
        envelope
            .count
            .ok_or_else(|| FetchError::Decode("response has no `count` field".to_string()))
    }

    pub async fn fetch_page(&self, task: IngestionTask) -> Result<Vec<CatalogItem>, FetchError> {
        let url = self.page_url(task.page, task.page_size);
        let envelope = self.fetch_envelope(&url).await?;
        let results = envelope
            .results
            .ok_or_else(|| FetchError::Decode("response has no `results` array".to_string()))?;

        Ok(results.into_iter().map(CatalogItem::from).collect())
    }

    async fn fetch_envelope(&self, url: &str) -> Result<PageEnvelope, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("GET {}", parsed);

        let response = self
            .http_client
            .get(parsed)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

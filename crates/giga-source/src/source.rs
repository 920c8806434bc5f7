//! HTTP retrieval of school-master records.

use anyhow::Context;
use serde::Deserialize;
use sync_core::{Source, SourceRecord};
use tracing::debug;

/// Connection options for the school-master API.
#[derive(Debug, Clone)]
pub struct SourceOpts {
    /// Endpoint URL returning `{ "data": [ ... ] }`
    pub url: String,
    /// Bearer token
    pub token: String,
    /// Query parameter name carrying the offset (page index or record
    /// offset, depending on pagination mode)
    pub offset_param: String,
    /// Query parameter name carrying the page size
    pub limit_param: String,
}

impl Default for SourceOpts {
    fn default() -> Self {
        SourceOpts {
            url: String::new(),
            token: String::new(),
            offset_param: "page".to_string(),
            limit_param: "size".to_string(),
        }
    }
}

/// The response envelope: records live under `data`.
#[derive(Deserialize)]
struct Envelope {
    data: Vec<SourceRecord>,
}

/// HTTP implementation of [`Source`].
pub struct GigaSource {
    client: reqwest::Client,
    opts: SourceOpts,
}

impl GigaSource {
    pub fn new(opts: SourceOpts) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("school-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(GigaSource { client, opts })
    }

    async fn fetch(&self, query: &[(&str, String)]) -> anyhow::Result<Vec<SourceRecord>> {
        let response = self
            .client
            .get(&self.opts.url)
            .query(query)
            .bearer_auth(&self.opts.token)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.opts.url))?
            .error_for_status()
            .with_context(|| format!("Source at {} returned an error status", self.opts.url))?;

        let envelope: Envelope = response
            .json()
            .await
            .context("Failed to decode source response body")?;

        debug!("Fetched {} record(s) from source", envelope.data.len());
        Ok(envelope.data)
    }
}

#[async_trait::async_trait]
impl Source for GigaSource {
    async fn fetch_page(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<SourceRecord>> {
        let query = [
            (self.opts.offset_param.as_str(), offset.to_string()),
            (self.opts.limit_param.as_str(), limit.to_string()),
        ];
        self.fetch(&query).await
    }

    async fn fetch_all(&self) -> anyhow::Result<Vec<SourceRecord>> {
        self.fetch(&[]).await
    }
}

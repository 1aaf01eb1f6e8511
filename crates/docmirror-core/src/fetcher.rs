//! HTTP access for sitemaps and Markdown documents.
//!
//! Sitemap requests fail with an [`Error`]; document requests fail with a
//! [`FailureReason`] so the downloader can record them per entry.

use crate::config::MirrorConfig;
use crate::download::FailureReason;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};

/// Network seam used by the sitemap step and the downloader.
///
/// [`Fetcher`] is the production implementation; tests swap in fakes that
/// count in-flight requests or serve canned bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET a text resource, failing on any non-success status.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// GET a document body, classifying every failure instead of erroring.
    async fn fetch_document(&self, url: &str) -> std::result::Result<Vec<u8>, FailureReason>;
}

/// HTTP client shared by every request of a run
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with the transport settings from `config`
    pub fn new(config: &MirrorConfig) -> Result<Self> {
        Self::with_options(config.timeout(), &config.user_agent)
    }

    /// Creates a fetcher with an explicit timeout and user agent (primarily for tests)
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for Fetcher {
    #[instrument(skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "fetched text");
        Ok(body)
    }

    async fn fetch_document(&self, url: &str) -> std::result::Result<Vec<u8>, FailureReason> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FailureReason::NotFound);
        }
        if !status.is_success() {
            return Err(FailureReason::Status(status.as_u16()));
        }

        // Buffer the whole body; a read failure here discards everything.
        let body = response.bytes().await.map_err(classify)?;
        Ok(body.to_vec())
    }
}

fn classify(err: reqwest::Error) -> FailureReason {
    if err.is_timeout() {
        FailureReason::Timeout
    } else {
        FailureReason::Network(err.to_string())
    }
}

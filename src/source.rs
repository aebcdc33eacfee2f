//! Manifest retrieval
//!
//! `ManifestSource` is the seam between the loader and the origin. The HTTP
//! implementation always asks the origin for fresh bytes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::LoadError;

#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Human readable location, for logs
    fn location(&self) -> &str;

    /// Raw manifest text, exactly as served
    async fn fetch(&self) -> Result<String, LoadError>;
}

#[async_trait]
impl<T: ManifestSource + ?Sized> ManifestSource for Arc<T> {
    fn location(&self) -> &str {
        (**self).location()
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        (**self).fetch().await
    }
}

/// Resolve the manifest URL, joining a relative path onto `base` when given
pub fn resolve_url(base: Option<&str>, manifest: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(manifest) {
        return Ok(url);
    }
    let base = base.with_context(|| {
        format!("Manifest URL '{manifest}' is not absolute and no base_url is configured")
    })?;
    let base = Url::parse(base).context(format!("Invalid base_url '{base}'"))?;
    base.join(manifest)
        .context(format!("Failed to join '{manifest}' onto '{base}'"))
}

pub struct HttpSource {
    client: Client,
    url: Url,
    location: String,
}

impl HttpSource {
    /// Build a source for `url`
    /// `timeout` of `None` leaves the client's default behaviour in place
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            location: url.to_string(),
            url,
        })
    }
}

#[async_trait]
impl ManifestSource for HttpSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        debug!(url = %self.url, "Fetching manifest");
        let response = self
            .client
            .get(self.url.clone())
            .header(CACHE_CONTROL, "no-store, no-cache, max-age=0")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| LoadError::unavailable(&self.location, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::unavailable(&self.location, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| LoadError::unavailable(&self.location, e))
    }
}

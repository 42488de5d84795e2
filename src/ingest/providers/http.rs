// src/ingest/providers/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::error::ClientError;
use crate::ingest::types::{RawResponse, SourceClient, SourceConfig};

/// GETs `params.url` and decodes the body as a [`RawResponse`].
///
/// Every transport, status or decoding problem is transient; a source with
/// no `url` can never succeed and is reported as structural.
pub struct HttpSourceClient {
    client: reqwest::Client,
}

impl HttpSourceClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch(&self, source: &SourceConfig) -> Result<RawResponse, ClientError> {
        let url = source.param_str("url").ok_or_else(|| {
            ClientError::structural(format!("source '{}' has no url", source.name))
        })?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::transient(format!("http get: {e}")))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| ClientError::transient(format!("http status: {e}")))?;
        resp.json::<RawResponse>()
            .await
            .map_err(|e| ClientError::transient(format!("decoding body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_url_is_structural() {
        let c = HttpSourceClient::new(Duration::from_secs(1)).unwrap();
        let err = c.fetch(&SourceConfig::new("acme")).await.unwrap_err();
        assert!(matches!(err, ClientError::Structural(_)));
    }
}

// src/ingest/providers/fixture.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use crate::error::ClientError;
use crate::ingest::types::{RawResponse, SourceClient, SourceConfig};
use crate::ordered::OrderedMap;

/// Answers fetches from canned responses keyed by source name.
///
/// Fixture file shape:
/// ```json
/// { "acme": {"status": "success", "data": {"metrics": {"revenue": [100, 150]}}} }
/// ```
/// A source with no entry fails every attempt (transient).
#[derive(Debug, Clone, Default)]
pub struct FixtureClient {
    responses: HashMap<String, RawResponse>,
}

impl FixtureClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, source: impl Into<String>, resp: RawResponse) -> Self {
        self.responses.insert(source.into(), resp);
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let parsed: OrderedMap<RawResponse> =
            serde_json::from_str(s).context("parsing fixture responses")?;
        Ok(Self {
            responses: parsed.into_iter().collect(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixtures from {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[async_trait]
impl SourceClient for FixtureClient {
    async fn fetch(&self, source: &SourceConfig) -> Result<RawResponse, ClientError> {
        self.responses
            .get(&source.name)
            .cloned()
            .ok_or_else(|| ClientError::transient(format!("no fixture for '{}'", source.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::MetricValue;

    #[tokio::test]
    async fn answers_known_sources_and_fails_unknown() {
        let c = FixtureClient::from_json_str(
            r#"{"acme": {"status": "success", "data": {"metrics": {"revenue": [1, 2]}}}}"#,
        )
        .unwrap();
        assert_eq!(c.len(), 1);

        let r = c.fetch(&SourceConfig::new("acme")).await.unwrap();
        assert_eq!(
            r.payload.metrics.get("revenue"),
            Some(&MetricValue::Series(vec![1.0, 2.0]))
        );

        let err = c.fetch(&SourceConfig::new("ghost")).await.unwrap_err();
        assert!(matches!(err, ClientError::Transient(_)));
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(FixtureClient::from_json_str("[1, 2]").is_err());
    }
}

// src/ingest/types.rs
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ClientError;
use crate::ordered::OrderedMap;

/// One configured origin of metrics. `params` is passed through untouched to
/// the client (URL, ticker, account id, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: serde_json::Value::Null,
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    /// String parameter lookup, e.g. `param_str("url")`.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(serde_json::Value::as_str)
    }
}

/// A metric is either a single reading or a time-ordered series (oldest first).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Series(Vec<f64>),
}

impl MetricValue {
    /// Most recent reading; `None` for an empty series.
    pub fn latest(&self) -> Option<f64> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::Series(s) => s.last().copied(),
        }
    }

    /// View as a series; a scalar is a one-point series.
    pub fn as_series(&self) -> &[f64] {
        match self {
            MetricValue::Scalar(v) => std::slice::from_ref(v),
            MetricValue::Series(s) => s,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Scalar(v)
    }
}

impl From<Vec<f64>> for MetricValue {
    fn from(v: Vec<f64>) -> Self {
        MetricValue::Series(v)
    }
}

pub type MetricMap = OrderedMap<MetricValue>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsPayload {
    #[serde(default)]
    pub metrics: MetricMap,
}

/// What a single fetch attempt returned. Wire shape:
/// `{"status": "success", "data": {"metrics": {...}}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawResponse {
    pub status: ResponseStatus,
    #[serde(rename = "data", default)]
    pub payload: MetricsPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RawResponse {
    pub fn success(metrics: MetricMap) -> Self {
        Self {
            status: ResponseStatus::Success,
            payload: MetricsPayload { metrics },
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            payload: MetricsPayload::default(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Successful responses by source name, in configured order.
/// A missing key means that source failed every attempt.
pub type FetchResult = OrderedMap<RawResponse>;

/// Performs one logical fetch attempt against one source.
///
/// Timeouts belong to the implementation; the fetcher only retries.
#[async_trait::async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch(&self, source: &SourceConfig) -> Result<RawResponse, ClientError>;
}

#[async_trait::async_trait]
impl<T: SourceClient + ?Sized> SourceClient for Arc<T> {
    async fn fetch(&self, source: &SourceConfig) -> Result<RawResponse, ClientError> {
        (**self).fetch(source).await
    }
}

/// Adapts a plain function into a [`SourceClient`].
pub struct FnClient<F>(pub F);

impl<F> FnClient<F>
where
    F: Fn(&SourceConfig) -> Result<RawResponse, ClientError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait::async_trait]
impl<F> SourceClient for FnClient<F>
where
    F: Fn(&SourceConfig) -> Result<RawResponse, ClientError> + Send + Sync,
{
    async fn fetch(&self, source: &SourceConfig) -> Result<RawResponse, ClientError> {
        (self.0)(source)
    }
}

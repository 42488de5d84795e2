// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ordered;
pub mod pipeline;
pub mod store;
pub mod telemetry;
pub mod transform;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{AnalysisResult, Analyzer, AnalyzerConfig, Anomaly, Trend};
pub use crate::error::{ClientError, DataFetchingError};
pub use crate::ingest::types::{
    FetchResult, FnClient, MetricMap, MetricValue, RawResponse, ResponseStatus,
    SourceClient, SourceConfig,
};
pub use crate::ingest::{RetryPolicy, RetryingFetcher};
pub use crate::ordered::OrderedMap;
pub use crate::pipeline::{Pipeline, PipelineOutput};
pub use crate::store::{BatchStore, MemoryStore};
pub use crate::transform::{transform, ProcessedBatch, Record};

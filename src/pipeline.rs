//! # Pipeline
//! One batch run: fetch all sources → transform → store → analyze each record.
//!
//! Runs are sequential. The store is injected so concurrent runs can share a
//! lock-protected (or versioned) implementation.

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;

use crate::analyze::{AnalysisResult, Analyzer, AnalyzerConfig};
use crate::error::DataFetchingError;
use crate::ingest::types::{SourceClient, SourceConfig};
use crate::ingest::{RetryPolicy, RetryingFetcher};
use crate::ordered::OrderedMap;
use crate::store::BatchStore;
use crate::transform::{transform, ProcessedBatch};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Completed pipeline runs.");
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when the pipeline last completed."
        );
    });
}

/// What a successful run hands back. The processed batch is also in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub processed: ProcessedBatch,
    pub analysis: OrderedMap<AnalysisResult>,
}

pub struct Pipeline {
    fetcher: RetryingFetcher<Arc<dyn SourceClient>>,
    store: Arc<dyn BatchStore>,
    analyzer: Analyzer,
}

impl Pipeline {
    pub fn new(client: Arc<dyn SourceClient>, store: Arc<dyn BatchStore>) -> Self {
        Self::with_config(
            client,
            store,
            RetryPolicy::default(),
            AnalyzerConfig::default(),
        )
    }

    pub fn with_config(
        client: Arc<dyn SourceClient>,
        store: Arc<dyn BatchStore>,
        policy: RetryPolicy,
        analyzer: AnalyzerConfig,
    ) -> Self {
        Self {
            fetcher: RetryingFetcher::with_policy(client, policy),
            store,
            analyzer: Analyzer::new(analyzer),
        }
    }

    pub fn store(&self) -> &Arc<dyn BatchStore> {
        &self.store
    }

    /// Run one batch. A structural fetch fault leaves the store untouched.
    pub async fn run(&self, sources: &[SourceConfig]) -> Result<PipelineOutput, DataFetchingError> {
        ensure_metrics_described();

        let fetched = self.fetcher.fetch_all(sources).await?;
        let processed = transform(sources, &fetched);
        self.store.store(processed.clone());

        let analysis = processed
            .iter()
            .map(|(name, record)| (name, self.analyzer.analyze(record)))
            .collect::<OrderedMap<_>>();

        counter!("pipeline_runs_total").increment(1);
        gauge!("pipeline_last_run_ts").set(Utc::now().timestamp() as f64);
        tracing::info!(
            target: "pipeline",
            configured = sources.len(),
            processed = processed.len(),
            "pipeline run complete"
        );

        Ok(PipelineOutput {
            processed,
            analysis,
        })
    }
}

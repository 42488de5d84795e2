//! finmetrics-pipeline — Binary Entrypoint
//! Loads config, runs one fetch → transform → cache → analyze batch and
//! prints the result as JSON.
//!
//! Sources are answered from a fixture file (`PIPELINE_FIXTURE_PATH`, default
//! `config/fixtures.json`). With the `ingest-http` feature and
//! `PIPELINE_SOURCE=http`, each source's `params.url` is fetched instead.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use finmetrics_pipeline::config::load_config_default;
use finmetrics_pipeline::ingest::providers::fixture::FixtureClient;
use finmetrics_pipeline::telemetry::{init_tracing, Metrics};
use finmetrics_pipeline::{MemoryStore, Pipeline, SourceClient};

const DEFAULT_FIXTURE_PATH: &str = "config/fixtures.json";

fn build_client() -> Result<Arc<dyn SourceClient>> {
    #[cfg(feature = "ingest-http")]
    {
        use finmetrics_pipeline::ingest::providers::http::HttpSourceClient;
        if std::env::var("PIPELINE_SOURCE").is_ok_and(|v| v.eq_ignore_ascii_case("http")) {
            let timeout_secs: u64 = std::env::var("PIPELINE_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10);
            let client = HttpSourceClient::new(std::time::Duration::from_secs(timeout_secs))?;
            return Ok(Arc::new(client));
        }
    }

    let path = std::env::var("PIPELINE_FIXTURE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_FIXTURE_PATH));
    let client = FixtureClient::from_path(&path)?;
    tracing::info!(fixtures = client.len(), path = %path.display(), "loaded fixture client");
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let print_metrics = std::env::var("PIPELINE_PRINT_METRICS").is_ok_and(|v| v == "1");
    let metrics = if print_metrics {
        Some(Metrics::init()?)
    } else {
        None
    };

    let cfg = load_config_default()?;
    tracing::info!(sources = cfg.sources.len(), "pipeline config loaded");

    let pipeline = Pipeline::with_config(
        build_client()?,
        Arc::new(MemoryStore::new()),
        cfg.fetch,
        cfg.analysis,
    );

    let out = pipeline.run(&cfg.sources).await?;
    let json = serde_json::to_string_pretty(&out).context("serializing pipeline output")?;
    println!("{json}");

    if let Some(m) = metrics {
        println!("{}", m.render());
    }
    Ok(())
}

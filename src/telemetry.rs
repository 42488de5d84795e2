// src/telemetry.rs
use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Process-wide Prometheus recorder for the `metrics` facade.
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the recorder. Only one recorder can exist per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self { handle })
    }

    /// Prometheus exposition text for everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global tracing subscriber.
///
/// Filter from `RUST_LOG` (default `info`). `PIPELINE_LOG_JSON=1` switches the
/// compact console format to one JSON object per line.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("PIPELINE_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialised: {e}");
    }
}

//! # Transform
//! Turns a [`FetchResult`] into a [`ProcessedBatch`]: one [`Record`] per
//! configured source that actually arrived.
//!
//! Iteration is driven by configuration, not by the fetched keys, so the
//! batch order and the "missing" warnings follow the configured list.
//! Each record is stamped when it is transformed, not when it was fetched.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::ingest::types::{FetchResult, MetricMap, SourceConfig};
use crate::ordered::OrderedMap;

/// Canonical per-source shape after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub metrics: MetricMap,
    pub timestamp: DateTime<Utc>,
}

impl Record {
    pub fn new(metrics: MetricMap) -> Self {
        Self {
            metrics,
            timestamp: Utc::now(),
        }
    }
}

/// Records by source name, in configured order.
pub type ProcessedBatch = OrderedMap<Record>;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "transform_missing_total",
            "Configured sources absent from the fetch result."
        );
    });
}

/// Normalize every configured source present in `fetched`.
pub fn transform(sources: &[SourceConfig], fetched: &FetchResult) -> ProcessedBatch {
    transform_with_clock(sources, fetched, Utc::now)
}

/// Same as [`transform`], with the timestamp source injected.
pub fn transform_with_clock<F>(
    sources: &[SourceConfig],
    fetched: &FetchResult,
    mut now: F,
) -> ProcessedBatch
where
    F: FnMut() -> DateTime<Utc>,
{
    ensure_metrics_described();

    let mut processed = ProcessedBatch::new();
    for source in sources {
        let Some(resp) = fetched.get(&source.name) else {
            counter!("transform_missing_total").increment(1);
            tracing::warn!(target: "transform", source = %source.name, "missing data from source");
            continue;
        };

        processed.insert(
            source.name.clone(),
            Record {
                metrics: resp.payload.metrics.clone(),
                timestamp: now(),
            },
        );
    }
    processed
}

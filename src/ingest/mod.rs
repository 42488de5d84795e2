// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::error::{ClientError, DataFetchingError};
use crate::ingest::types::{FetchResult, RawResponse, SourceClient, SourceConfig};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One-time metrics registration (so series show up on scrape).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_attempt_failures_total",
            "Failed fetch attempts (transient), per source."
        );
        describe_counter!(
            "ingest_sources_dropped_total",
            "Sources omitted after exhausting every attempt."
        );
        describe_counter!(
            "ingest_sources_fetched_total",
            "Sources fetched successfully within their retry budget."
        );
        describe_histogram!(
            "ingest_fetch_ms",
            "Wall time of one source's fetch loop in milliseconds."
        );
    });
}

fn default_max_attempts() -> u32 {
    3
}

/// How hard to try each source before giving up on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per source, including the first. 0 is treated as 1.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed pause between failed attempts of the same source.
    #[serde(default)]
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: 0,
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Wraps a [`SourceClient`] with a bounded retry loop per source and collects
/// the survivors into a [`FetchResult`].
pub struct RetryingFetcher<C> {
    client: C,
    policy: RetryPolicy,
}

/// Outcome of one source's retry loop.
enum SourceOutcome {
    Fetched(RawResponse),
    Exhausted,
}

impl<C: SourceClient> RetryingFetcher<C> {
    pub fn new(client: C) -> Self {
        Self::with_policy(client, RetryPolicy::default())
    }

    pub fn with_policy(client: C, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch every configured source, in order.
    ///
    /// Sources that fail all attempts are left out of the result. Only a
    /// structural fault (blank source name, or a client reporting
    /// [`ClientError::Structural`]) fails the whole call. Names are checked
    /// up front, so a blank one means no source is fetched at all.
    pub async fn fetch_all(
        &self,
        sources: &[SourceConfig],
    ) -> Result<FetchResult, DataFetchingError> {
        ensure_metrics_described();

        // Reject a malformed batch before any client call.
        if let Some(pos) = sources.iter().position(|s| s.name.trim().is_empty()) {
            tracing::error!(
                target: "ingest",
                position = pos,
                error = %ClientError::structural("source with blank name"),
                "data fetching failed"
            );
            return Err(DataFetchingError);
        }

        let mut out = FetchResult::new();
        for source in sources {
            match self.fetch_source(source).await {
                Ok(SourceOutcome::Fetched(resp)) => {
                    counter!("ingest_sources_fetched_total").increment(1);
                    // Duplicate names overwrite the earlier entry.
                    out.insert(source.name.clone(), resp);
                }
                Ok(SourceOutcome::Exhausted) => {
                    counter!("ingest_sources_dropped_total").increment(1);
                    tracing::error!(
                        target: "ingest",
                        source = %source.name,
                        attempts = self.policy.attempts(),
                        "failed to fetch data from source"
                    );
                }
                Err(cause) => {
                    tracing::error!(
                        target: "ingest",
                        source = %source.name,
                        error = %cause,
                        "data fetching failed"
                    );
                    return Err(DataFetchingError);
                }
            }
        }

        tracing::debug!(
            target: "ingest",
            configured = sources.len(),
            fetched = out.len(),
            "fetch batch complete"
        );
        Ok(out)
    }

    /// Sequential retry loop for a single source. `Err` only for structural faults.
    async fn fetch_source(&self, source: &SourceConfig) -> Result<SourceOutcome, ClientError> {
        let attempts = self.policy.attempts();
        let t0 = Instant::now();
        let mut outcome = SourceOutcome::Exhausted;

        for attempt in 1..=attempts {
            let reason = match self.client.fetch(source).await {
                Ok(resp) if resp.is_success() => {
                    outcome = SourceOutcome::Fetched(resp);
                    break;
                }
                Ok(resp) => resp
                    .message
                    .unwrap_or_else(|| "upstream reported failure".to_string()),
                Err(ClientError::Transient(reason)) => reason,
                Err(fatal @ ClientError::Structural(_)) => return Err(fatal),
            };

            counter!("ingest_attempt_failures_total", "source" => source.name.clone())
                .increment(1);
            tracing::warn!(
                target: "ingest",
                source = %source.name,
                attempt,
                attempts,
                reason = %reason,
                "API request failed"
            );

            if attempt < attempts && self.policy.retry_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.policy.retry_delay_ms)).await;
            }
        }

        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(outcome)
    }
}

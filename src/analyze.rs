//! # Analyzer
//! Lightweight per-record pass: a coarse revenue trend plus magnitude-based
//! anomaly flags. Pure apart from the clock, which can be injected.
//!
//! Trend compares the last two revenue points, with a missing previous
//! point read as `0.0`. A single positive reading therefore classifies as
//! `Upward`; callers relying on trends should require at least two points.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::transform::Record;

/// Metrics key holding the revenue series.
pub const REVENUE_KEY: &str = "revenue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Upward,
    Downward,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub metric: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
}

fn default_anomaly_threshold() -> f64 {
    100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// A metric is anomalous when `|value| > anomaly_threshold` (strict).
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: default_anomaly_threshold(),
        }
    }
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("analyze_anomalies_total", "Anomalies flagged by the analyzer.");
    });
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    cfg: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(cfg: AnalyzerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> AnalyzerConfig {
        self.cfg
    }

    pub fn analyze(&self, record: &Record) -> AnalysisResult {
        self.analyze_at(record, Utc::now())
    }

    /// Analyze with an explicit "now" for anomaly timestamps.
    pub fn analyze_at(&self, record: &Record, now: DateTime<Utc>) -> AnalysisResult {
        ensure_metrics_described();

        let trend = record
            .metrics
            .get(REVENUE_KEY)
            .map(|revenue| detect_trend(revenue.as_series()));

        let anomalies = self.detect_anomalies(record, now);
        if !anomalies.is_empty() {
            counter!("analyze_anomalies_total").increment(anomalies.len() as u64);
        }

        AnalysisResult { trend, anomalies }
    }

    fn detect_anomalies(&self, record: &Record, now: DateTime<Utc>) -> Vec<Anomaly> {
        record
            .metrics
            .iter()
            .filter(|(_, value)| {
                value
                    .latest()
                    .is_some_and(|v| v.abs() > self.cfg.anomaly_threshold)
            })
            .map(|(key, _)| Anomaly {
                metric: key.to_string(),
                timestamp: now,
            })
            .collect()
    }
}

/// Classify the last step of `series`. Missing points read as `0.0`.
pub fn detect_trend(series: &[f64]) -> Trend {
    let last = series.last().copied().unwrap_or(0.0);
    let prev = if series.len() > 1 {
        series[series.len() - 2]
    } else {
        0.0
    };

    if last > prev {
        Trend::Upward
    } else if last < prev {
        Trend::Downward
    } else {
        Trend::Stable
    }
}

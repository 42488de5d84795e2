// src/config.rs
//! Loading a [`PipelineConfig`] from disk. The library core never calls this;
//! it only ever sees the parsed structures.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::AnalyzerConfig;
use crate::ingest::types::SourceConfig;
use crate::ingest::RetryPolicy;

pub const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub fetch: RetryPolicy,
    #[serde(default)]
    pub analysis: AnalyzerConfig,
}

/// Load from an explicit path. TOML or JSON, picked by extension.
pub fn load_config_from(path: &Path) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading pipeline config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing pipeline config {}", path.display()))
}

/// Load using env var + fallbacks:
/// 1) $PIPELINE_CONFIG_PATH
/// 2) config/pipeline.toml
/// 3) config/pipeline.json
///
/// With none of them present, returns the default (no sources).
pub fn load_config_default() -> Result<PipelineConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/pipeline.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/pipeline.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    Ok(PipelineConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<PipelineConfig> {
    match hint_ext {
        "toml" => return toml::from_str(s).context("invalid TOML"),
        "json" => return serde_json::from_str(s).context("invalid JSON"),
        _ => {}
    }
    // Unknown extension: sniff. A TOML document cannot open with `{`.
    if s.trim_start().starts_with('{') {
        serde_json::from_str(s).context("invalid JSON (sniffed)")
    } else {
        toml::from_str(s).context("invalid TOML (sniffed)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_with_defaults() {
        let cfg = parse_config(
            r#"
[[sources]]
name = "acme"
params = { url = "https://example.test/acme" }

[[sources]]
name = "globex"
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.sources.len(), 2);
        assert_eq!(cfg.sources[0].param_str("url"), Some("https://example.test/acme"));
        assert!(cfg.sources[1].params.is_null());
        assert_eq!(cfg.fetch, RetryPolicy::default());
        assert_eq!(cfg.analysis.anomaly_threshold, 100.0);
    }

    #[test]
    fn json_overrides() {
        let cfg = parse_config(
            r#"{"sources":[{"name":"a"}],"fetch":{"max_attempts":5},"analysis":{"anomaly_threshold":1e6}}"#,
            "json",
        )
        .unwrap();
        assert_eq!(cfg.fetch.max_attempts, 5);
        assert_eq!(cfg.fetch.retry_delay_ms, 0);
        assert_eq!(cfg.analysis.anomaly_threshold, 1e6);
    }

    #[test]
    fn sniffs_unknown_extension() {
        let j = parse_config(r#"{"sources":[{"name":"a"}]}"#, "").unwrap();
        let t = parse_config("[[sources]]\nname = \"a\"\n", "conf").unwrap();
        assert_eq!(j, t);
        assert!(parse_config("not a config at all [", "").is_err());
    }

    #[test]
    fn sniffed_json_keeps_parse_error() {
        let err = parse_config(r#"{"sources": [{"name": "acme"},]}"#, "conf").unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("invalid JSON"), "{chain}");
        assert!(chain.contains("trailing comma"), "{chain}");
        assert!(!chain.contains("TOML"), "{chain}");
    }

    #[test]
    fn sniffed_toml_keeps_parse_error() {
        let err = parse_config("[[sources]]\nname = \n", "").unwrap_err();
        assert!(format!("{err:#}").contains("invalid TOML"));
    }

    #[test]
    fn source_without_name_is_rejected() {
        assert!(parse_config(r#"{"sources":[{"params":{}}]}"#, "json").is_err());
    }
}

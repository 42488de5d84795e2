// tests/config_loading.rs
use finmetrics_pipeline::config::{load_config_default, load_config_from, ENV_CONFIG_PATH};
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("pipeline.toml");
    fs::write(
        &p_toml,
        r#"
[[sources]]
name = "acme"

[[sources]]
name = "globex"
params = { ticker = "GLX" }

[fetch]
max_attempts = 4
"#,
    )
    .unwrap();
    let t = load_config_from(&p_toml).unwrap();
    assert_eq!(t.sources.len(), 2);
    assert_eq!(t.sources[1].param_str("ticker"), Some("GLX"));
    assert_eq!(t.fetch.max_attempts, 4);

    let p_json = dir.path().join("pipeline.json");
    fs::write(
        &p_json,
        r#"{"sources":[{"name":"acme"}],"analysis":{"anomaly_threshold":250}}"#,
    )
    .unwrap();
    let j = load_config_from(&p_json).unwrap();
    assert_eq!(j.sources[0].name, "acme");
    assert_eq!(j.fetch.max_attempts, 3);
    assert_eq!(j.analysis.anomaly_threshold, 250.0);
}

#[test]
fn broken_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("pipeline.json");
    fs::write(&p, "{ nope").unwrap();
    let err = load_config_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("pipeline.json"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_CONFIG_PATH);

    // 1) Nothing anywhere → empty default
    let v = load_config_default().unwrap();
    assert!(v.sources.is_empty());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("pipeline.toml"),
        "[[sources]]\nname = \"from-toml\"\n",
    )
    .unwrap();
    let vt = load_config_default().unwrap();
    assert_eq!(vt.sources[0].name, "from-toml");

    // 3) Env var wins
    let p_env = tmp.path().join("elsewhere.json");
    fs::write(&p_env, r#"{"sources":[{"name":"from-env"}]}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    let ve = load_config_default().unwrap();
    assert_eq!(ve.sources[0].name, "from-env");

    // 4) Env var pointing nowhere is an error, not a silent fallback
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(load_config_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}

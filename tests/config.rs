use svmserve_core::config::AppConfig;
use tempfile::TempDir;

#[test]
fn test_load_layers_file_over_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("svmserve.toml");
    std::fs::write(
        &path,
        r#"
[server]
request_timeout_secs = 5

[metrics]
latency_buckets = [0.001, 0.01, 0.1]

[model]
scaler_file = "standard_scaler.json"

[health]
fault_threshold = 9
"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.server.request_timeout_secs, 5);
    assert_eq!(config.metrics.latency_buckets, vec![0.001, 0.01, 0.1]);
    assert_eq!(config.model.scaler_file, "standard_scaler.json");
    assert_eq!(config.model.model_file, "model.json");
    assert_eq!(config.health.fault_threshold, 9);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_requires_named_file() {
    let dir = TempDir::new().unwrap();
    assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
}

#[test]
fn test_load_json_and_yaml_files() {
    let dir = TempDir::new().unwrap();

    let json_path = dir.path().join("config.json");
    std::fs::write(
        &json_path,
        r#"{"health": {"fault_threshold": 3}, "server": {"request_timeout_secs": 12}}"#,
    )
    .unwrap();
    let config = AppConfig::load(Some(&json_path)).unwrap();
    assert_eq!(config.health.fault_threshold, 3);
    assert_eq!(config.server.request_timeout_secs, 12);
    assert_eq!(config.model.expected_features, 30);

    let yaml_path = dir.path().join("config.yaml");
    std::fs::write(&yaml_path, "metrics:\n  latency_buckets: [0.5, 1.0]\n").unwrap();
    let config = AppConfig::load(Some(&yaml_path)).unwrap();
    assert_eq!(config.metrics.latency_buckets, vec![0.5, 1.0]);
}

#[test]
fn test_printed_config_loads_back() {
    let config = AppConfig::builder()
        .server(|s| s.request_timeout_secs(7))
        .fault_threshold(4)
        .build();
    let text = config.to_toml().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("printed.toml");
    std::fs::write(&path, text).unwrap();

    let loaded = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(loaded.server.request_timeout_secs, 7);
    assert_eq!(loaded.health, config.health);
    assert_eq!(loaded.metrics.latency_buckets, config.metrics.latency_buckets);
}

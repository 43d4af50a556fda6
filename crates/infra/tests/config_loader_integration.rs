//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::time::Duration;

use listsync_domain::ClientConfig;
use listsync_infra::config;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut temp_file =
        tempfile::Builder::new().suffix(suffix).tempfile().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    temp_file
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
client_identifier = "6f1c2b8e-3f43-4a57-9d6e-0c2b6a4f5e11"

[api]
base_url = "https://staging.example.com/"
timeout_ms = 5000
max_concurrency = 2

[realtime]
enabled = false
heartbeat_interval_ms = 10000
max_missed_heartbeats = 5

[queue]
retry_delay_ms = 2500

[logging]
level = "listsync=debug"
json = true
"#;
    let temp_file = write_config(".toml", toml_content);

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.api.base_url, "https://staging.example.com/");
    assert_eq!(config.api.timeout(), Duration::from_secs(5));
    assert_eq!(config.api.max_concurrency, 2);
    assert_eq!(config.api.api_version, "3");
    assert!(!config.realtime.enabled);
    assert_eq!(config.realtime.heartbeat_interval(), Duration::from_secs(10));
    assert_eq!(config.realtime.max_missed_heartbeats, 5);
    assert_eq!(config.realtime.initial_retry_delay(), Duration::from_millis(500));
    assert_eq!(config.queue.retry_delay(), Duration::from_millis(2500));
    assert_eq!(config.logging.level, "listsync=debug");
    assert!(config.logging.json);
    assert_eq!(
        config.client_identifier.map(|id| id.to_string()).as_deref(),
        Some("6f1c2b8e-3f43-4a57-9d6e-0c2b6a4f5e11")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "api": { "max_concurrency": 8 },
        "realtime": { "url": "ws://127.0.0.1:9000/listen" }
    }"#;
    let temp_file = write_config(".json", json_content);

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.api.max_concurrency, 8);
    assert_eq!(config.realtime.url, "ws://127.0.0.1:9000/listen");
    assert_eq!(config.queue, ClientConfig::default().queue);
    assert!(config.client_identifier.is_none());
}

#[test]
fn test_file_values_that_fail_validation_still_parse() {
    let temp_file = write_config(
        ".toml",
        "[realtime]\ninitial_retry_delay_ms = 5000\nmax_retry_delay_ms = 1000\n",
    );

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("parsing does not validate");

    let err = config.validate().expect_err("floor above ceiling must be rejected");
    assert!(err.to_string().contains("initial_retry_delay_ms"));
}

#[test]
fn test_unknown_type_is_rejected() {
    let temp_file = write_config(".toml", "[api]\nmax_concurrency = \"five\"\n");

    let err = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect_err("string where a number belongs");
    assert!(err.to_string().contains("Invalid TOML format"));
}

//! Configuration loading and validation tests

use std::io::Write;
use std::time::Duration;

use promrelay::config::{LogFormat, PluginConfig};
use promrelay::errors::MetricsError;
use promrelay::system::identity::instance_name_for;
use tempfile::NamedTempFile;

fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
    Some(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn toml_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn config_error(result: promrelay::Result<PluginConfig>) -> String {
    match result {
        Err(MetricsError::Configuration(msg)) => msg,
        Err(other) => panic!("expected a configuration error, got {}", other),
        Ok(_) => panic!("expected a configuration error"),
    }
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_from_env() {
    let config = PluginConfig::load_from(
        None,
        env(&[
            ("PUSH_GATEWAY_URL", "http://gateway:9091"),
            ("PUSH_JOB_NAME", "api"),
            ("PUSH_FREQUENCY", "1m30s"),
            ("ROOT_URL", "https://app.example.com"),
            ("LOG_FORMAT", "json"),
        ]),
    )
    .unwrap();

    assert_eq!(config.gateway_url(), Some("http://gateway:9091"));
    assert_eq!(config.log_format, LogFormat::Json);

    let settings = config.push_settings().unwrap().unwrap();
    assert_eq!(settings.interval, Duration::from_secs(90));
    assert_eq!(settings.timeout, Duration::from_secs(5));
    assert_eq!(settings.installation_domain, "app.example.com");
}

#[test]
fn test_load_from_file_with_env_override() {
    let file = toml_file(
        r#"
push_gateway_url = "http://gateway:9091"
push_job_name = "from-file"
push_frequency = "30s"
push_timeout = "2s"
root_url = "https://app.example.com"
metrics_mount_path = "/metrics"
"#,
    );

    let config = PluginConfig::load_from(
        Some(file.path()),
        env(&[("PUSH_JOB_NAME", "from-env")]),
    )
    .unwrap();

    assert_eq!(config.push_job_name.as_deref(), Some("from-env"));
    assert_eq!(config.mount_path(), Some("/metrics"));
    let settings = config.push_settings().unwrap().unwrap();
    assert_eq!(settings.job_name, "from-env");
    assert_eq!(settings.timeout, Duration::from_secs(2));
}

#[test]
fn test_missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let config = PluginConfig::load_from(
        Some(&missing),
        env(&[("METRICS_MOUNT_PATH", "/metrics")]),
    )
    .unwrap();
    assert_eq!(config.mount_path(), Some("/metrics"));
}

#[test]
fn test_test_mode_and_worker_id_from_env() {
    let config = PluginConfig::load_from(
        None,
        env(&[("TEST_MODE", "true"), ("WORKER_ID", "7")]),
    )
    .unwrap();
    assert!(config.test_mode);
    assert_eq!(config.worker_id(), Some("7"));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_requires_an_output() {
    let msg = config_error(PluginConfig::load_from(None, env(&[])));
    assert!(msg.contains("PUSH_GATEWAY_URL"));
    assert!(msg.contains("METRICS_MOUNT_PATH"));
}

#[test]
fn test_gateway_requires_job_and_frequency() {
    let msg = config_error(PluginConfig::load_from(
        None,
        env(&[
            ("PUSH_GATEWAY_URL", "http://gateway:9091"),
            ("PUSH_FREQUENCY", "10s"),
            ("ROOT_URL", "https://app.example.com"),
        ]),
    ));
    assert!(msg.contains("PUSH_JOB_NAME"));

    let msg = config_error(PluginConfig::load_from(
        None,
        env(&[
            ("PUSH_GATEWAY_URL", "http://gateway:9091"),
            ("PUSH_JOB_NAME", "api"),
            ("ROOT_URL", "https://app.example.com"),
        ]),
    ));
    assert!(msg.contains("PUSH_FREQUENCY"));
}

#[test]
fn test_gateway_requires_root_url() {
    let msg = config_error(PluginConfig::load_from(
        None,
        env(&[
            ("PUSH_GATEWAY_URL", "http://gateway:9091"),
            ("PUSH_JOB_NAME", "api"),
            ("PUSH_FREQUENCY", "10s"),
        ]),
    ));
    assert!(msg.contains("ROOT_URL"));
}

#[test]
fn test_invalid_values_rejected() {
    let cases: [&[(&str, &str)]; 4] = [
        &[("METRICS_MOUNT_PATH", "metrics")],
        &[("METRICS_MOUNT_PATH", "/metrics"), ("PUSH_TIMEOUT", "soon")],
        &[
            ("PUSH_GATEWAY_URL", "gateway:9091/path"),
            ("PUSH_JOB_NAME", "api"),
            ("PUSH_FREQUENCY", "10s"),
            ("ROOT_URL", "https://app.example.com"),
        ],
        &[
            ("PUSH_GATEWAY_URL", "http://gateway:9091"),
            ("PUSH_JOB_NAME", "api"),
            ("PUSH_FREQUENCY", "0s"),
            ("ROOT_URL", "https://app.example.com"),
        ],
    ];

    for vars in cases {
        assert!(
            PluginConfig::load_from(None, env(vars)).is_err(),
            "{:?} should be rejected",
            vars
        );
    }
}

#[test]
fn test_test_mode_allows_no_output() {
    let config = PluginConfig {
        test_mode: true,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
    assert!(config.push_settings().unwrap().is_none());
}

#[test]
fn test_bare_number_frequency_is_millis() {
    let config = PluginConfig {
        push_gateway_url: Some("http://gateway:9091".into()),
        push_job_name: Some("api".into()),
        push_frequency: Some("2500".into()),
        root_url: Some("https://app.example.com".into()),
        ..Default::default()
    };
    let settings = config.push_settings().unwrap().unwrap();
    assert_eq!(settings.interval, Duration::from_millis(2500));
}

#[test]
fn test_logging_config_derived() {
    let config = PluginConfig {
        log_level: "debug".into(),
        log_file: Some("".into()),
        test_mode: true,
        ..Default::default()
    };
    let logging = config.logging();
    assert_eq!(logging.level, "debug");
    assert_eq!(logging.format, LogFormat::Text);
    assert!(logging.file.is_none());
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn test_instance_identity() {
    assert_eq!(instance_name_for("host-a", Some("4")), "host-a-4");
    assert_eq!(instance_name_for("host-a", None), "host-a");

    let config = PluginConfig {
        push_gateway_url: Some("http://gateway:9091".into()),
        push_job_name: Some("api".into()),
        push_frequency: Some("10s".into()),
        root_url: Some("https://app.example.com".into()),
        worker_id: Some("4".into()),
        ..Default::default()
    };
    let settings = config.push_settings().unwrap().unwrap();
    assert!(settings.instance.ends_with("-4"));
}

// Configuration module unit tests

use kagami::config::*;
use kagami::error::ConfigError;
use std::io::Write;

#[test]
fn test_can_deserialize_full_config() {
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 9090
  threads: 2
upstream:
  endpoint: "https://images.internal:8443"
  timeout: 5
store:
  kind: memory
  config_key: "signing"
  record:
    key: "abcd"
    salt: "ef01"
    signature_size: 16
    arguments_separator: ","
    log_level: warn
options:
  extended: true
logging:
  level: debug
  format: pretty
"#;
    let config = Config::from_yaml_with_env(yaml).expect("Failed to parse config");

    assert_eq!(config.server.listen_addr(), "127.0.0.1:9090");
    assert_eq!(config.server.threads, 2);
    assert_eq!(
        config.upstream.address(),
        Some(UpstreamAddress {
            host: "images.internal".to_string(),
            port: 8443,
            use_tls: true,
        })
    );
    assert_eq!(config.upstream.timeout, 5);
    assert_eq!(config.store.kind, StoreKind::Memory);
    assert_eq!(config.store.config_key, "signing");

    let record = config.store.record.expect("record should be present");
    assert_eq!(record.signature_size, 16);
    assert_eq!(record.arguments_separator, ',');
    assert_eq!(record.log_level, LogLevel::Warn);

    assert!(config.options.extended);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_env_var_substitution() {
    std::env::set_var("KAGAMI_TEST_UPSTREAM_ENDPOINT", "http://imgproxy:8080");
    let yaml = r#"
upstream:
  endpoint: "${KAGAMI_TEST_UPSTREAM_ENDPOINT}"
store:
  path: "/var/lib/kagami"
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.upstream.endpoint, "http://imgproxy:8080");
}

#[test]
fn test_zero_port_rejected() {
    let yaml = r#"
server:
  port: 0
upstream:
  endpoint: "http://imgproxy:8080"
store:
  path: "./kv"
"#;
    assert!(matches!(
        Config::from_yaml_with_env(yaml),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_invalid_separator_in_record_rejected() {
    let yaml = r#"
upstream:
  endpoint: "http://imgproxy:8080"
store:
  kind: memory
  record:
    arguments_separator: "/"
"#;
    assert!(matches!(
        Config::from_yaml_with_env(yaml),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "upstream:\n  endpoint: \"http://imgproxy:8080\"\nstore:\n  path: \"./kv\"\n"
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.store.path.as_deref(), Some("./kv"));
}

#[test]
fn test_from_missing_file() {
    assert!(matches!(
        Config::from_file("/nonexistent/kagami.yaml"),
        Err(ConfigError::Io(_))
    ));
}

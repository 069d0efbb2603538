// Configuration store unit tests

use kagami::config::Config;
use kagami::error::RewriteError;
use kagami::store::*;

fn memory_config() -> Config {
    Config::from_yaml_with_env(
        r#"
upstream:
  endpoint: "http://imgproxy:8080"
store:
  kind: memory
  config_key: "signing"
  record:
    key: "simplekey"
    salt: "simplesalt"
    trusted_signatures: ["abc"]
"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_memory_store_from_config() {
    let config = memory_config();
    let store = from_config(&config).unwrap();

    let signing = fetch_signing_config(store.as_ref(), &config.store.config_key)
        .await
        .unwrap();
    assert_eq!(signing.key, "simplekey");
    assert_eq!(signing.trusted_signatures, vec!["abc"]);
    assert!(signing.signing_enabled());
}

#[tokio::test]
async fn test_file_store_from_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"key": "aa", "salt": "bb", "log_level": "debug"}"#,
    )
    .unwrap();

    let yaml = format!(
        "upstream:\n  endpoint: \"http://imgproxy:8080\"\nstore:\n  path: \"{}\"\n",
        dir.path().display()
    );
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    let store = from_config(&config).unwrap();

    let signing = fetch_signing_config(store.as_ref(), "config").await.unwrap();
    assert_eq!(signing.salt, "bb");
}

#[tokio::test]
async fn test_missing_file_record_is_config_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    let err = fetch_signing_config(&store, "config").await.unwrap_err();
    assert!(matches!(err, RewriteError::ConfigUnavailable(_)));
    assert_eq!(err.to_http_status(), 403);
}

#[tokio::test]
async fn test_malformed_record_is_config_unavailable() {
    let store = MemoryStore::new().with_entry("config", r#"{"signature_size": "big"}"#);
    let err = fetch_signing_config(&store, "config").await.unwrap_err();
    assert!(matches!(err, RewriteError::ConfigUnavailable(_)));
}

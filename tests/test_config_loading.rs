//! Tests for configuration file loading and validation

use pubsub_relay::config::{ConfigError, RelayConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_load_valid_config_file() {
    let file = write_config(
        r#"
[server]
bind = "127.0.0.1"
port = 9090

[broker]
public_keys_env = "BROKER_PUBLIC_KEYS"

[archive]
endpoint = "https://storage.example.com"
bucket = "trashcan"
topic_prefix = "devices/metadata/"
"#,
    );

    let config = RelayConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.archive.bucket, "trashcan");
    assert_eq!(config.archive.topic_prefix, "devices/metadata/");
}

#[test]
fn test_load_minimal_config_applies_defaults() {
    let file = write_config(
        r#"
[archive]
endpoint = "http://localhost:9000"
bucket = "archive"
"#,
    );

    let config = RelayConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.server.bind, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.archive.topic_prefix, "devices/metadata/");
}

#[test]
fn test_load_rejects_invalid_toml() {
    let file = write_config("this is not [valid toml");

    let result = RelayConfig::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_load_rejects_missing_archive_section() {
    let file = write_config(
        r#"
[server]
port = 8080
"#,
    );

    let result = RelayConfig::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_load_rejects_invalid_endpoint() {
    let file = write_config(
        r#"
[archive]
endpoint = "not a url"
bucket = "archive"
"#,
    );

    let result = RelayConfig::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
fn test_load_missing_file_errors() {
    let result = RelayConfig::load_from_file(std::path::Path::new("/nonexistent/relay.toml"));
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}

#[test]
fn test_loaded_inline_keys_resolve() {
    let file = write_config(
        r#"
[archive]
endpoint = "http://localhost:9000"
bucket = "archive"

[[broker.public_keys.keys]]
kid = "k1"
key = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
"#,
    );

    let config = RelayConfig::load_from_file(file.path()).unwrap();
    let key_set = config.broker.resolve_key_set().unwrap();
    assert_eq!(key_set.keys.len(), 1);
}

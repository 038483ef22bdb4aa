//! Configuration system for the relay
//!
//! All process-wide state (listen address, broker key set, object-store
//! binding, archival topic prefix) is loaded once at startup from a TOML
//! file into an explicit configuration struct and treated as read-only
//! afterwards. Secrets (key set document, store token) are referenced by
//! environment variable name and resolved through helper methods.

use crate::auth::BrokerKeySet;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Main relay configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub broker: BrokerSection,
    pub archive: ArchiveSection,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// Bind address (default: 0.0.0.0)
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Listen port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerSection {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind, self.port).parse().map_err(|_| {
            ConfigError::InvalidConfig(format!(
                "invalid listen address: {}:{}",
                self.bind, self.port
            ))
        })
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Broker authentication settings
///
/// The key set may be embedded inline or referenced via an environment
/// variable holding the JSON document the broker's key endpoint serves.
/// With neither present the resolved set is empty and every request is
/// rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BrokerSection {
    /// Inline public key set
    pub public_keys: Option<BrokerKeySet>,
    /// Environment variable containing the JSON key set document
    pub public_keys_env: Option<String>,
}

impl BrokerSection {
    /// Resolve the effective key set. Inline keys take precedence over the
    /// environment variable.
    pub fn resolve_key_set(&self) -> Result<BrokerKeySet, ConfigError> {
        if let Some(keys) = &self.public_keys {
            return Ok(keys.clone());
        }
        if let Some(env_name) = &self.public_keys_env {
            let document = std::env::var(env_name)
                .map_err(|_| ConfigError::EnvVarNotFound(env_name.clone()))?;
            return BrokerKeySet::from_json(&document)
                .map_err(|e| ConfigError::InvalidKeySet(e.to_string()));
        }
        Ok(BrokerKeySet::default())
    }
}

/// Object storage and archival settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveSection {
    /// Object store endpoint URL
    pub endpoint: String,
    /// Bucket name archival records are written into
    pub bucket: String,
    /// Topic prefix selecting messages for archival
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
    /// Environment variable containing the store bearer token
    pub auth_token_env: Option<String>,
}

fn default_topic_prefix() -> String {
    "devices/metadata/".to_string()
}

impl ArchiveSection {
    /// Get the store bearer token from its environment variable, if any
    pub fn resolve_auth_token(&self) -> Option<String> {
        self.auth_token_env
            .as_ref()
            .and_then(|name| std::env::var(name).ok())
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid broker key set: {0}")]
    InvalidKeySet(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RelayConfig {
    /// Load configuration from TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: RelayConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = Url::parse(&self.archive.endpoint).map_err(|e| {
            ConfigError::InvalidConfig(format!(
                "archive endpoint '{}' is not a valid URL: {e}",
                self.archive.endpoint
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidConfig(format!(
                "archive endpoint must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }
        if self.archive.bucket.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "archive bucket must not be empty".to_string(),
            ));
        }
        self.server.socket_addr()?;
        Ok(())
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[server]
bind = "127.0.0.1"
port = 0

[broker]

[archive]
endpoint = "http://localhost:9000"
bucket = "message-archive"
topic_prefix = "devices/metadata/"
"#;
        toml::from_str(toml_content).expect("Test config should parse")
    }
}

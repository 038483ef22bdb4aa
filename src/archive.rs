//! Object storage client for message archival
//!
//! Archive records are write-once: a selected batch is serialized as one
//! JSON array and stored under a freshly generated random key. There is no
//! read, update, or delete path.

use crate::protocol::messages::PubSubMessage;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Content type for archived message batches
pub const ARCHIVE_CONTENT_TYPE: &str = "application/json";

/// Errors from archival writes. These are never surfaced to the request
/// caller; the detached writer logs them and moves on.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to serialize archive record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("object store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("object store rejected write of '{key}' with status {status}")]
    StoreStatus { key: String, status: u16 },
}

/// Write-only seam over the object storage backend.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key` with the given content type.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), ArchiveError>;
}

/// HTTP object store speaking a plain `PUT {endpoint}/{bucket}/{key}`
/// protocol, optionally authenticated with a bearer token.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    auth_token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, bucket: &str, auth_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            auth_token,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), ArchiveError> {
        let url = self.object_url(key);
        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::StoreStatus {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        debug!("archived object '{}' ({})", key, content_type);
        Ok(())
    }
}

/// Serializes selected message subsets and writes each as a single archive
/// record under a fresh UUID key.
#[derive(Clone)]
pub struct ArchiveWriter {
    store: Arc<dyn ObjectStore>,
}

impl ArchiveWriter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Write one archive record containing `messages`, returning the key it
    /// was stored under. Keys are independently generated per write, so no
    /// record can overwrite another.
    pub async fn write_batch(&self, messages: &[PubSubMessage]) -> Result<String, ArchiveError> {
        let key = Uuid::new_v4().to_string();
        let body = serde_json::to_vec(messages)?;
        self.store.put(&key, body, ARCHIVE_CONTENT_TYPE).await?;
        Ok(key)
    }
}

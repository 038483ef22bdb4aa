//! Mock implementations for testing
//!
//! Provides a mock ObjectStore that records writes in memory, enabling
//! archival tests without a storage backend.

use crate::archive::{ArchiveError, ObjectStore};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One recorded `put` call against the mock store
#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Mock object store for testing
#[derive(Debug, Default)]
pub struct MockObjectStore {
    puts: Arc<Mutex<Vec<RecordedPut>>>,
    should_fail: bool,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub async fn recorded_puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().await.clone()
    }

    pub async fn put_count(&self) -> usize {
        self.puts.lock().await.len()
    }

    pub async fn clear_history(&self) {
        self.puts.lock().await.clear();
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), ArchiveError> {
        if self.should_fail {
            return Err(ArchiveError::StoreStatus {
                key: key.to_string(),
                status: 503,
            });
        }

        let mut puts = self.puts.lock().await;
        puts.push(RecordedPut {
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}

//! Message routing with detached archival
//!
//! The router forwards every message it receives: the returned batch is the
//! input batch, unchanged and in order. Its only side effect is scheduling
//! one archival write per request when the topic filter selects a non-empty
//! subset. That write is fire-and-forget: it is spawned on the runtime,
//! never awaited by the request, and its outcome cannot influence the
//! response. In-flight writes may be abandoned if the process tears down
//! first; they are best-effort and never retried.

use crate::archive::{ArchiveWriter, ObjectStore};
use crate::archive_span;
use crate::observability::metrics::metrics;
use crate::protocol::{MessageBatch, PubSubMessage, TopicFilter};
use std::sync::Arc;
use tracing::{debug, warn, Instrument};

/// Routes pushed batches back to the broker and archives the topic-matched
/// subset on the side.
pub struct MessageRouter {
    filter: TopicFilter,
    writer: ArchiveWriter,
}

impl MessageRouter {
    pub fn new(filter: TopicFilter, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            filter,
            writer: ArchiveWriter::new(store),
        }
    }

    /// Forward-all policy: returns the input batch untouched. When any
    /// message's topic matches the filter, exactly one detached archival
    /// task is spawned for the selected subset; an empty selection spawns
    /// nothing.
    pub fn route(&self, batch: MessageBatch) -> MessageBatch {
        let selected = self.filter.select(&batch);
        if !selected.is_empty() {
            debug!(
                "archiving {} of {} messages matching '{}'",
                selected.len(),
                batch.len(),
                self.filter.prefix()
            );
            self.spawn_archive(selected);
        }
        batch
    }

    fn spawn_archive(&self, selected: Vec<PubSubMessage>) {
        let writer = self.writer.clone();
        let count = selected.len() as u64;
        let span = archive_span!(message_count = count);
        tokio::spawn(
            async move {
                match writer.write_batch(&selected).await {
                    Ok(key) => {
                        metrics().archive_write_succeeded(count);
                        debug!("archived {} messages under key '{}'", count, key);
                    }
                    Err(e) => {
                        // Invisible to the request caller; the write was detached.
                        metrics().archive_write_failed();
                        warn!("archive write failed: {e}");
                    }
                }
            }
            .instrument(span),
        );
    }
}

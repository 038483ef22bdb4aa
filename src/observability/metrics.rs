//! Thread-safe metrics collection system
//!
//! Provides atomic counters for tracking request handling and archival
//! activity. The snapshot is exported on the health endpoint.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Global metrics collector instance
pub static METRICS: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Get reference to global metrics collector
pub fn metrics() -> &'static MetricsCollector {
    &METRICS
}

/// Thread-safe metrics collector using atomic counters
pub struct MetricsCollector {
    // Request handling metrics
    batches_received: AtomicU64,
    requests_rejected: AtomicU64,
    decode_failures: AtomicU64,
    messages_forwarded: AtomicU64,

    // Archival metrics
    archive_writes: AtomicU64,
    archive_failures: AtomicU64,
    messages_archived: AtomicU64,

    uptime_start: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            batches_received: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            messages_forwarded: AtomicU64::new(0),
            archive_writes: AtomicU64::new(0),
            archive_failures: AtomicU64::new(0),
            messages_archived: AtomicU64::new(0),
            uptime_start: AtomicU64::new(current_timestamp()),
        }
    }

    // Request handling metrics
    pub fn batch_received(&self, message_count: u64) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
        self.messages_forwarded
            .fetch_add(message_count, Ordering::Relaxed);
    }

    pub fn request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_failed(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Archival metrics
    pub fn archive_write_succeeded(&self, message_count: u64) {
        self.archive_writes.fetch_add(1, Ordering::Relaxed);
        self.messages_archived
            .fetch_add(message_count, Ordering::Relaxed);
    }

    pub fn archive_write_failed(&self) {
        self.archive_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of all counters for export
    pub fn get_metrics(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        let start = self.uptime_start.load(Ordering::Relaxed);

        MetricsSnapshot {
            batches_received: self.batches_received.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            messages_forwarded: self.messages_forwarded.load(Ordering::Relaxed),
            archive_writes: self.archive_writes.load(Ordering::Relaxed),
            archive_failures: self.archive_failures.load(Ordering::Relaxed),
            messages_archived: self.messages_archived.load(Ordering::Relaxed),
            uptime_seconds: now.saturating_sub(start),
        }
    }

    /// Reset all counters. Intended for tests sharing the global collector.
    pub fn reset(&self) {
        self.batches_received.store(0, Ordering::Relaxed);
        self.requests_rejected.store(0, Ordering::Relaxed);
        self.decode_failures.store(0, Ordering::Relaxed);
        self.messages_forwarded.store(0, Ordering::Relaxed);
        self.archive_writes.store(0, Ordering::Relaxed);
        self.archive_failures.store(0, Ordering::Relaxed);
        self.messages_archived.store(0, Ordering::Relaxed);
        self.uptime_start.store(current_timestamp(), Ordering::Relaxed);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of the collector at one point in time
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricsSnapshot {
    pub batches_received: u64,
    pub requests_rejected: u64,
    pub decode_failures: u64,
    pub messages_forwarded: u64,
    pub archive_writes: u64,
    pub archive_failures: u64,
    pub messages_archived: u64,
    pub uptime_seconds: u64,
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

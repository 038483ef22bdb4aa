//! Pub/Sub push relay
//!
//! An HTTP push endpoint for a publish/subscribe broker. The broker pushes
//! batches of messages to this service; the relay verifies the request was
//! signed by the trusted broker, archives the subset of messages whose topic
//! matches a configured prefix to object storage (detached from the request,
//! never awaited), and echoes the full batch back so the broker continues
//! delivery.
//!
//! # Overview
//!
//! This crate provides:
//! - Broker request authentication over Ed25519-signed request bodies
//! - A message model that carries unknown attributes untouched
//! - Topic-prefix selection and fire-and-forget archival to an object store
//! - The warp HTTP boundary gluing the pipeline together
//!
//! # Quick Start
//!
//! ```rust
//! use pubsub_relay::protocol::{PubSubMessage, TopicFilter};
//!
//! let batch: Vec<PubSubMessage> = serde_json::from_str(
//!     r#"[{"topic":"devices/metadata/1","payload":"a"},{"topic":"other/x","payload":"b"}]"#,
//! ).unwrap();
//!
//! let filter = TopicFilter::new("devices/metadata/");
//! let selected = filter.select(&batch);
//! assert_eq!(selected.len(), 1);
//! assert_eq!(selected[0].topic, "devices/metadata/1");
//! ```

pub mod archive;
pub mod auth;
pub mod config;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod router;
pub mod server;
pub mod testing;

// Re-export the request pipeline types
pub use archive::{ArchiveWriter, HttpObjectStore, ObjectStore};
pub use auth::{BrokerAuth, BrokerKeySet};
pub use config::*;
pub use error::{RelayError, RelayResult};
pub use protocol::*;
pub use router::MessageRouter;
pub use server::{routes, RelayState};

//! Message model and topic filtering for broker push delivery
//!
//! This module implements the message structures the broker pushes over HTTP
//! and the topic predicate used to select messages for archival.

pub mod messages;
pub mod topics;

pub use messages::*;
pub use topics::*;

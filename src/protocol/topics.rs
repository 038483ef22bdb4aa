//! Topic prefix filtering for archival selection
//!
//! Messages are selected for archival by a pure, stateless prefix predicate
//! over their topic string. Selection is independent per message and never
//! reorders the selected subset.

use crate::protocol::messages::PubSubMessage;

/// Prefix predicate over hierarchical topic strings.
///
/// Matching is an exact byte-wise prefix test: no wildcard expansion, no
/// segment splitting, no case folding. An empty prefix matches every topic.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicFilter {
    prefix: String,
}

impl TopicFilter {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True iff the topic starts with the configured prefix.
    pub fn matches(&self, topic: &str) -> bool {
        topic.starts_with(&self.prefix)
    }

    /// Returns the matching subset of a batch, cloned, in input order.
    pub fn select(&self, batch: &[PubSubMessage]) -> Vec<PubSubMessage> {
        batch
            .iter()
            .filter(|msg| self.matches(&msg.topic))
            .cloned()
            .collect()
    }
}

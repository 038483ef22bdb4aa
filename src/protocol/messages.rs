//! Message types for broker push delivery
//!
//! The broker delivers an ordered JSON array of messages per request and
//! expects the same schema back. Only the topic is interpreted here; every
//! other attribute is carried opaquely and must survive a round trip
//! unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single publish/subscribe message as delivered by the broker.
///
/// The topic is the only field this service reads. All remaining attributes
/// (payload, metadata, broker-specific fields) are captured by the flattened
/// map so they are forwarded and archived exactly as received, in delivery
/// order. Serialization writes the topic first, then the attributes in the
/// order they arrived.
///
/// # Examples
/// ```
/// use pubsub_relay::protocol::PubSubMessage;
///
/// let msg: PubSubMessage = serde_json::from_str(
///     r#"{"topic": "devices/metadata/sensor-1", "payload": "online", "qos": 1}"#,
/// ).unwrap();
/// assert_eq!(msg.topic, "devices/metadata/sensor-1");
/// assert_eq!(msg.attributes["payload"], "online");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PubSubMessage {
    /// Hierarchical, slash-delimited topic string
    pub topic: String,
    /// All other message attributes, preserved verbatim
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

/// An ordered batch of messages delivered in one push request.
///
/// Order is significant: the broker may interpret the response array
/// positionally, so the batch must be returned with length and ordering
/// intact.
pub type MessageBatch = Vec<PubSubMessage>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(topic: &str, payload: &str) -> PubSubMessage {
        let mut attributes = serde_json::Map::new();
        attributes.insert("payload".to_string(), json!(payload));
        PubSubMessage {
            topic: topic.to_string(),
            attributes,
        }
    }

    #[test]
    fn test_unknown_fields_round_trip_byte_for_byte() {
        // Attribute order deliberately disagrees with sorted key order.
        let input = r#"{"topic":"devices/metadata/1","payload":"a","messageId":"m-1","publishedAt":1712000000}"#;
        let msg: PubSubMessage = serde_json::from_str(input).unwrap();

        assert_eq!(msg.topic, "devices/metadata/1");
        assert_eq!(msg.attributes["payload"], "a");
        assert_eq!(msg.attributes["messageId"], "m-1");
        assert_eq!(msg.attributes["publishedAt"], 1712000000);

        let reserialized = serde_json::to_string(&msg).unwrap();
        assert_eq!(reserialized, input);
    }

    #[test]
    fn test_batch_preserves_order() {
        let input = r#"[{"topic":"a/1","payload":"x"},{"topic":"b/2","payload":"y"},{"topic":"a/3","payload":"z"}]"#;
        let batch: MessageBatch = serde_json::from_str(input).unwrap();

        let topics: Vec<&str> = batch.iter().map(|m| m.topic.as_str()).collect();
        assert_eq!(topics, vec!["a/1", "b/2", "a/3"]);
    }

    #[test]
    fn test_missing_topic_is_rejected() {
        let result: Result<PubSubMessage, _> = serde_json::from_str(r#"{"payload":"a"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_batch_parses() {
        let batch: MessageBatch = serde_json::from_str("[]").unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_nested_payload_preserved() {
        let mut msg = message("devices/metadata/1", "a");
        msg.attributes
            .insert("meta".to_string(), json!({"fw": "1.2.3", "tags": ["a", "b"]}));

        let json = serde_json::to_string(&msg).unwrap();
        let back: PubSubMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}

//! Game event types.
//!
//! Events are the authoritative facts produced by applying a command. The
//! engine provides the envelope; games define their own event type strings
//! and payload shapes. The flow machine and processor add a small engine
//! vocabulary of their own (see `flow::events` and `processor::system`).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::player::PlayerId;

/// A game event with a JSON payload.
///
/// Events are immutable once recorded. Together with the initial state and
/// the command sequence they describe every state change of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// The type of event.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event data.
    #[serde(default)]
    pub payload: Value,

    /// Timestamp of the command that produced this event.
    #[serde(default)]
    pub timestamp: u64,
}

impl GameEvent {
    /// Create a new event with an empty object payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: Value::Object(Map::new()),
            timestamp: 0,
        }
    }

    /// Replace the payload (builder pattern).
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Set one payload field (builder pattern).
    ///
    /// A non-object payload is replaced by an object holding the field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.payload.is_object() {
            self.payload = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.payload {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Set the timestamp (builder pattern).
    #[must_use]
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check the event type.
    #[must_use]
    pub fn is(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }

    /// Look up a payload field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// String payload field.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    /// Integer payload field, or a default.
    #[must_use]
    pub fn int_field(&self, key: &str, default: i64) -> i64 {
        self.field(key).and_then(Value::as_i64).unwrap_or(default)
    }

    /// Player payload field, accepting `"1"` or `1`.
    #[must_use]
    pub fn player_field(&self, key: &str) -> Option<PlayerId> {
        self.field(key).and_then(|v| PlayerId::deserialize(v).ok())
    }

    /// Decode the payload into a typed struct.
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_builder() {
        let event = GameEvent::new("DAMAGE_DEALT")
            .with_field("targetId", "1")
            .with_field("amount", 3)
            .at(10);

        assert!(event.is("DAMAGE_DEALT"));
        assert_eq!(event.str_field("targetId"), Some("1"));
        assert_eq!(event.int_field("amount", 0), 3);
        assert_eq!(event.int_field("missing", -1), -1);
        assert_eq!(event.player_field("targetId"), Some(PlayerId::new(1)));
        assert_eq!(event.timestamp, 10);
    }

    #[test]
    fn test_with_field_replaces_scalar_payload() {
        let event = GameEvent::new("X").with_payload(json!(5)).with_field("a", 1);
        assert_eq!(event.payload, json!({ "a": 1 }));
    }

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::new("PHASE_ADVANCED")
            .with_payload(json!({ "from": "main1", "to": "main2" }));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "PHASE_ADVANCED");
        assert_eq!(json["payload"]["to"], "main2");
    }

    #[test]
    fn test_parse_payload() {
        #[derive(Deserialize)]
        struct Moved {
            from: String,
            to: String,
        }

        let event = GameEvent::new("PHASE_ADVANCED")
            .with_payload(json!({ "from": "a", "to": "b" }));
        let moved: Moved = event.parse_payload().unwrap();
        assert_eq!(moved.from, "a");
        assert_eq!(moved.to, "b");
    }
}

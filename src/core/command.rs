//! Command representation: a player's requested action.
//!
//! A command is a type string plus a JSON payload. Games define which
//! command types exist by registering handlers; the engine only owns the
//! flow and system vocabulary (`ADVANCE_PHASE`, `END_TURN`, `SET_READY`).
//!
//! Commands are immutable once issued. The timestamp is supplied by the
//! issuer and copied onto every event the command produces, so processing
//! never reads a clock.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RejectionReason;
use super::player::PlayerId;

/// A player's requested action.
///
/// ## Example
///
/// ```
/// use serde_json::json;
/// use tabletop_engine::core::{Command, PlayerId};
///
/// let play = Command::new("PLAY_CARD", PlayerId::new(0))
///     .with_payload(json!({ "cardId": "strike", "targetPlayerId": "1" }))
///     .at(1_000);
///
/// assert_eq!(play.command_type, "PLAY_CARD");
/// assert_eq!(play.str_field("cardId").unwrap(), "strike");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Command type (game-defined or engine-owned).
    #[serde(rename = "type")]
    pub command_type: String,

    /// Seat that issued the command.
    pub player_id: PlayerId,

    /// Command arguments.
    #[serde(default)]
    pub payload: Value,

    /// Issuer-supplied time in milliseconds.
    #[serde(default)]
    pub timestamp: u64,
}

impl Command {
    /// Create a command with an empty payload.
    #[must_use]
    pub fn new(command_type: impl Into<String>, player_id: PlayerId) -> Self {
        Self {
            command_type: command_type.into(),
            player_id,
            payload: Value::Null,
            timestamp: 0,
        }
    }

    /// Set the payload (builder pattern).
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Set the timestamp (builder pattern).
    #[must_use]
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check the command type.
    #[must_use]
    pub fn is(&self, command_type: &str) -> bool {
        self.command_type == command_type
    }

    /// Look up a payload field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Decode the whole payload into a typed struct.
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, RejectionReason> {
        T::deserialize(&self.payload)
            .map_err(|e| RejectionReason::InvalidPayload(e.to_string()))
    }

    /// Required string field.
    pub fn str_field(&self, key: &str) -> Result<&str, RejectionReason> {
        self.field(key)
            .and_then(Value::as_str)
            .ok_or_else(|| RejectionReason::InvalidPayload(format!("missing string field `{key}`")))
    }

    /// Optional player field, accepting `"1"` or `1`.
    pub fn player_field(&self, key: &str) -> Result<Option<PlayerId>, RejectionReason> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => PlayerId::deserialize(value)
                .map(Some)
                .map_err(|e| RejectionReason::InvalidPayload(format!("field `{key}`: {e}"))),
        }
    }
}

/// An accepted command together with its position in the match.
///
/// Used for:
/// - Replay and determinism verification
/// - Audit of the authoritative command order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    /// 1-based position among accepted commands.
    pub sequence: u64,

    /// Turn number when the command was applied.
    pub turn: u32,

    /// The command.
    pub command: Command,
}

impl CommandRecord {
    /// Create a new command record.
    #[must_use]
    pub fn new(sequence: u64, turn: u32, command: Command) -> Self {
        Self {
            sequence,
            turn,
            command,
        }
    }
}

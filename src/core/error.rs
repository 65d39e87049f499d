//! Error types.
//!
//! `RejectionReason` is the closed set of reasons the command processor may
//! refuse a command. Every rejection leaves the match state untouched; the
//! caller decides whether to surface it to the issuing player.
//!
//! `EngineError` covers failures of the hosting layer around the processor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debug::ReplayError;

/// Why a command was refused.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(tag = "reason", content = "detail")]
pub enum RejectionReason {
    /// The issuing player is not the current player.
    #[error("not your turn")]
    NotYourTurn,

    /// The issuing player has no seat in this match, or lacks the required role.
    #[error("invalid actor")]
    InvalidActor,

    /// The command is not allowed in the current phase.
    #[error("command not allowed in the current phase")]
    InvalidPhase,

    /// The command targets something it may not target.
    #[error("illegal target")]
    IllegalTarget,

    /// The player cannot pay for the command.
    #[error("insufficient resource")]
    InsufficientResource,

    /// No handler is registered for the command type.
    #[error("unknown command type")]
    UnknownCommandType,

    /// A registered flow guard blocked the transition.
    #[error("guard `{0}` blocked the transition")]
    GuardFailed(String),

    /// The payload does not have the shape the handler expects.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The match has already ended.
    #[error("match is over")]
    MatchOver,
}

/// Failures of the match host.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No match with this id is hosted.
    #[error("match `{0}` not found")]
    MatchNotFound(String),

    /// A match with this id already exists.
    #[error("match `{0}` already exists")]
    MatchExists(String),

    /// No game with this id is registered.
    #[error("unknown game `{0}`")]
    UnknownGame(String),

    /// The match configuration describes an impossible table.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),

    /// The processor refused the command.
    #[error("command rejected: {0}")]
    Rejected(#[from] RejectionReason),

    /// Debug tools are not enabled on this host.
    #[error("debug tools are disabled")]
    DebugDisabled,

    /// A debug state patch could not be applied.
    #[error("state patch failed: {0}")]
    Patch(String),

    /// Serializing state for a JSON consumer failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Replaying the accepted commands did not reproduce the live state.
    #[error(transparent)]
    Replay(#[from] ReplayError),

    /// The match worker is no longer running.
    #[error("match worker for `{0}` has stopped")]
    WorkerClosed(String),
}

impl EngineError {
    /// The rejection reason, if this error is a refused command.
    #[must_use]
    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            EngineError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display() {
        assert_eq!(RejectionReason::NotYourTurn.to_string(), "not your turn");
        assert_eq!(
            RejectionReason::GuardFailed("attackResolved".into()).to_string(),
            "guard `attackResolved` blocked the transition"
        );
    }

    #[test]
    fn test_rejection_serialization() {
        let json = serde_json::to_value(RejectionReason::GuardFailed("g".into())).unwrap();
        assert_eq!(json["reason"], "GuardFailed");
        assert_eq!(json["detail"], "g");

        let unit = serde_json::to_value(RejectionReason::NotYourTurn).unwrap();
        assert_eq!(unit["reason"], "NotYourTurn");

        let back: RejectionReason = serde_json::from_value(json).unwrap();
        assert_eq!(back, RejectionReason::GuardFailed("g".into()));
    }

    #[test]
    fn test_engine_error_from_rejection() {
        let err: EngineError = RejectionReason::IllegalTarget.into();
        assert_eq!(err.rejection(), Some(&RejectionReason::IllegalTarget));
        assert!(EngineError::DebugDisabled.rejection().is_none());
    }
}

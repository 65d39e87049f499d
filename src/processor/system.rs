//! Engine-owned events and the envelope changes they carry.
//!
//! Game events only touch `Core` (through the game's reducer). Engine
//! events also move the envelope: phase, turn, current player, ready flags
//! and the match result. The change is applied from the typed value, never
//! by re-reading the JSON payload.

use serde::Deserialize;
use serde_json::json;

use crate::core::config::PhaseId;
use crate::core::error::RejectionReason;
use crate::core::event::GameEvent;
use crate::core::player::PlayerId;
use crate::core::state::MatchState;
use crate::flow::{MATCH_ENDED, PHASE_ADVANCED, PLAYER_READY_CHANGED, TURN_ENDED};
use crate::rules::{CommandContext, GameResult};

/// Event produced by the engine itself.
#[derive(Clone, Debug, PartialEq)]
pub enum SystemEvent {
    /// The phase changed.
    PhaseAdvanced { from: PhaseId, to: PhaseId },
    /// A turn ended and passed to the next seat.
    TurnEnded {
        player_id: PlayerId,
        next_player_id: PlayerId,
        turn_number: u32,
    },
    /// A seat changed its ready flag.
    PlayerReadyChanged { player_id: PlayerId, ready: bool },
    /// The ruleset reported a result.
    MatchEnded { result: GameResult },
}

impl SystemEvent {
    /// Apply the envelope change.
    pub(crate) fn apply<C>(&self, state: &mut MatchState<C>) {
        match self {
            SystemEvent::PhaseAdvanced { to, .. } => {
                state.phase = to.clone();
            }
            SystemEvent::TurnEnded {
                next_player_id,
                turn_number,
                ..
            } => {
                state.current_player = *next_player_id;
                state.turn_number = turn_number + 1;
            }
            SystemEvent::PlayerReadyChanged { player_id, ready } => {
                if let Some(flag) = state.ready_players.try_get_mut(*player_id) {
                    *flag = *ready;
                }
            }
            SystemEvent::MatchEnded { result } => {
                state.game_over = Some(result.clone());
            }
        }
    }

    /// Event type string.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            SystemEvent::PhaseAdvanced { .. } => PHASE_ADVANCED,
            SystemEvent::TurnEnded { .. } => TURN_ENDED,
            SystemEvent::PlayerReadyChanged { .. } => PLAYER_READY_CHANGED,
            SystemEvent::MatchEnded { .. } => MATCH_ENDED,
        }
    }

    /// Wire form of the event.
    #[must_use]
    pub fn to_event(&self) -> GameEvent {
        let payload = match self {
            SystemEvent::PhaseAdvanced { from, to } => json!({ "from": from, "to": to }),
            SystemEvent::TurnEnded {
                player_id,
                next_player_id,
                turn_number,
            } => json!({
                "playerId": player_id,
                "nextPlayerId": next_player_id,
                "turnNumber": turn_number,
            }),
            SystemEvent::PlayerReadyChanged { player_id, ready } => {
                json!({ "playerId": player_id, "ready": ready })
            }
            SystemEvent::MatchEnded { result } => json!({ "result": result }),
        };
        GameEvent::new(self.event_type()).with_payload(payload)
    }
}

#[derive(Deserialize)]
struct ReadyPayload {
    #[serde(default = "default_ready")]
    ready: bool,
}

fn default_ready() -> bool {
    true
}

/// `SET_READY { ready? }`: any seat, any phase. A missing flag means ready.
pub(crate) fn set_ready<C>(ctx: &mut CommandContext<'_, C>) -> Result<(), RejectionReason> {
    let ready = if ctx.command().payload.is_null() {
        true
    } else {
        ctx.payload::<ReadyPayload>()?.ready
    };
    let player_id = ctx.actor();
    ctx.emit_system(SystemEvent::PlayerReadyChanged { player_id, ready });
    Ok(())
}

//! Turn and phase flow shared by every ruleset.
//!
//! ## Phases
//!
//! Each game configures an ordered, non-empty phase list. A turn starts in
//! the first phase; `ADVANCE_PHASE` walks the list and, from the last
//! phase, hands the turn to the next seat in player order.
//!
//! ## Guards
//!
//! Named predicates over `Core`, optionally scoped to the phase being left.
//! A failing guard rejects the transition with `GuardFailed(name)`.
//!
//! ## Auto-continue
//!
//! A game may report that its current phase has nothing left to do
//! (`Game::auto_continue`). After each accepted command the processor then
//! advances on the current player's behalf, at most `MAX_AUTO_ADVANCES`
//! times. A failing guard stops the chain without rejecting the command.
//!
//! ## Engine vocabulary
//!
//! | Command         | Actor          | Events                               |
//! |-----------------|----------------|--------------------------------------|
//! | `ADVANCE_PHASE` | current player | `PHASE_ADVANCED` (+ `TURN_ENDED`)    |
//! | `END_TURN`      | current player | `TURN_ENDED`, `PHASE_ADVANCED`       |
//! | `SET_READY`     | any player     | `PLAYER_READY_CHANGED`               |

pub mod guard;
pub(crate) mod machine;

pub use guard::{FlowConfig, FlowGuard, GuardFn};
pub use machine::MAX_AUTO_ADVANCES;

/// Advance to the next phase.
pub const ADVANCE_PHASE: &str = "ADVANCE_PHASE";
/// End the current turn from any phase.
pub const END_TURN: &str = "END_TURN";
/// Flag the issuing seat as ready or not ready.
pub const SET_READY: &str = "SET_READY";

/// Emitted on every phase change: `{ from, to }`.
pub const PHASE_ADVANCED: &str = "PHASE_ADVANCED";
/// Emitted when a turn ends: `{ playerId, nextPlayerId, turnNumber }`.
pub const TURN_ENDED: &str = "TURN_ENDED";
/// Emitted by `SET_READY`: `{ playerId, ready }`.
pub const PLAYER_READY_CHANGED: &str = "PLAYER_READY_CHANGED";
/// Emitted once when the ruleset reports a result: `{ result }`.
pub const MATCH_ENDED: &str = "MATCH_ENDED";

/// Whether a command type is handled by the engine rather than a game.
#[must_use]
pub fn is_engine_command(command_type: &str) -> bool {
    matches!(command_type, ADVANCE_PHASE | END_TURN | SET_READY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_commands() {
        assert!(is_engine_command("ADVANCE_PHASE"));
        assert!(is_engine_command("END_TURN"));
        assert!(is_engine_command("SET_READY"));
        assert!(!is_engine_command("PLAY_CARD"));
    }
}

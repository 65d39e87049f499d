//! The extension contract every ruleset implements.
//!
//! A game supplies:
//! - Its `Core` type and how to build the initial one
//! - A flow configuration (phase list and guards)
//! - A handler table for its command types
//! - A reducer folding events into `Core`
//! - Optional phase hooks, an auto-continue check, turn order, a terminal
//!   check and an action-log formatter
//!
//! The engine calls into `Game` but never interprets game-specific concepts
//! directly.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::context::CommandContext;
use super::handlers::HandlerTable;
use crate::actionlog::ActionLogFormatter;
use crate::core::config::{MatchConfig, PhaseId};
use crate::core::error::RejectionReason;
use crate::core::event::GameEvent;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;
use crate::core::state::MatchState;
use crate::flow::FlowConfig;

/// Result of a completed match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
    /// Multiple winners (team games, shared victory).
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }
}

/// Ruleset trait.
///
/// ## Implementation Notes
///
/// - `setup`: draw any randomness from the supplied RNG; it becomes the
///   match RNG afterwards
/// - `reduce`: must be deterministic and total. It sees every event,
///   including the engine's flow events, and ignores types it does not know
/// - `is_game_over`: return `None` while the match continues
pub trait Game: Send + Sync + 'static {
    /// Game-specific state.
    type Core: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Stable identifier used by hosts to pick the ruleset.
    fn id(&self) -> &'static str;

    /// Build the initial `Core` for a new match.
    fn setup(&self, config: &MatchConfig, rng: &mut GameRng) -> Self::Core;

    /// Phase list and guards.
    fn flow(&self) -> FlowConfig<Self::Core>;

    /// Handlers for this game's command types.
    fn handlers(&self) -> HandlerTable<Self::Core>;

    /// Fold one event into `Core`.
    fn reduce(&self, core: &mut Self::Core, event: &GameEvent);

    /// Runs before the match leaves `phase`. May emit events or reject.
    fn on_phase_exit(
        &self,
        _phase: &PhaseId,
        _ctx: &mut CommandContext<'_, Self::Core>,
    ) -> Result<(), RejectionReason> {
        Ok(())
    }

    /// Runs after the match enters `phase`. May emit events or reject.
    fn on_phase_enter(
        &self,
        _phase: &PhaseId,
        _ctx: &mut CommandContext<'_, Self::Core>,
    ) -> Result<(), RejectionReason> {
        Ok(())
    }

    /// Whether the match should leave its current phase on its own.
    ///
    /// Checked after every accepted command. While it returns `true` the
    /// processor advances the phase as if the current player had sent
    /// `ADVANCE_PHASE`, up to `MAX_AUTO_ADVANCES` times per command.
    fn auto_continue(&self, _state: &MatchState<Self::Core>) -> bool {
        false
    }

    /// Seat that takes the turn after `player`.
    ///
    /// Defaults to the next seat in player order. Games with eliminated
    /// seats override this to skip them.
    fn next_player(&self, state: &MatchState<Self::Core>, player: PlayerId) -> PlayerId {
        state.next_player_after(player)
    }

    /// Check if the match is over.
    fn is_game_over(&self, _state: &MatchState<Self::Core>) -> Option<GameResult> {
        None
    }

    /// Formatter turning accepted commands into action-log entries.
    fn action_log(&self) -> Option<&dyn ActionLogFormatter<Self::Core>> {
        None
    }
}

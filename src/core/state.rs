//! Match state: the engine envelope around a game's `Core`.
//!
//! ## MatchState
//!
//! One instance per live match:
//! - Game-specific `core` (opaque to the engine)
//! - Turn number, current player, phase
//! - Ready flags and host seat
//! - Player order and the state-carried RNG
//! - Accepted command count and the match result, once decided
//!
//! Every field is writable only inside the crate. Outside code reads state
//! through accessors and changes it by submitting commands.

use serde::{Deserialize, Serialize};

use super::config::{MatchConfig, PhaseId};
use super::player::{PlayerId, PlayerMap};
use super::rng::{fold64, GameRng};
use crate::rules::GameResult;

/// Authoritative state of one match.
///
/// Cloning is cheap when `Core` uses persistent collections; the processor
/// clones once per command to keep rejections atomic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState<C> {
    pub(crate) core: C,
    pub(crate) turn_number: u32,
    pub(crate) current_player: PlayerId,
    pub(crate) phase: PhaseId,
    pub(crate) ready_players: PlayerMap<bool>,
    pub(crate) host_player_id: PlayerId,
    pub(crate) player_order: Vec<PlayerId>,
    pub(crate) rng: GameRng,
    pub(crate) command_count: u64,
    pub(crate) game_over: Option<GameResult>,
}

impl<C> MatchState<C> {
    /// Create the initial state for a match.
    ///
    /// ## Defaults
    ///
    /// - `turn_number`: 1
    /// - `current_player`: first seat of the configured player order
    /// - `phase`: `first_phase`
    /// - `ready_players`: all false
    pub(crate) fn new(core: C, config: &MatchConfig, first_phase: PhaseId) -> Self {
        let player_order = config.player_order();
        let current_player = player_order[0];

        Self {
            core,
            turn_number: 1,
            current_player,
            phase: first_phase,
            ready_players: PlayerMap::with_value(config.player_count, false),
            host_player_id: config.host_player,
            player_order,
            rng: GameRng::new(config.seed),
            command_count: 0,
            game_over: None,
        }
    }

    /// Game-specific state.
    #[must_use]
    pub fn core(&self) -> &C {
        &self.core
    }

    /// Current turn (starts at 1).
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Seat whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> &PhaseId {
        &self.phase
    }

    /// Ready flags per seat.
    #[must_use]
    pub fn ready_players(&self) -> &PlayerMap<bool> {
        &self.ready_players
    }

    /// Whether a seat has flagged itself ready.
    #[must_use]
    pub fn is_ready(&self, player: PlayerId) -> bool {
        self.ready_players.try_get(player).copied().unwrap_or(false)
    }

    /// True when every seat is ready.
    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.ready_players.iter().all(|(_, ready)| *ready)
    }

    /// Seat that owns the room.
    #[must_use]
    pub fn host_player_id(&self) -> PlayerId {
        self.host_player_id
    }

    /// Seats in turn order.
    #[must_use]
    pub fn player_order(&self) -> &[PlayerId] {
        &self.player_order
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_order.len()
    }

    /// Whether a seat takes part in this match.
    #[must_use]
    pub fn is_seated(&self, player: PlayerId) -> bool {
        self.player_order.contains(&player)
    }

    /// Seat that moves after `player` in turn order.
    ///
    /// An unseated player maps to the first seat.
    #[must_use]
    pub fn next_player_after(&self, player: PlayerId) -> PlayerId {
        let position = self
            .player_order
            .iter()
            .position(|p| *p == player)
            .map_or(0, |i| (i + 1) % self.player_order.len());
        self.player_order[position]
    }

    /// The match RNG.
    #[must_use]
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    /// Number of accepted commands so far.
    #[must_use]
    pub fn command_count(&self) -> u64 {
        self.command_count
    }

    /// Match result once the match has ended.
    #[must_use]
    pub fn game_over(&self) -> Option<&GameResult> {
        self.game_over.as_ref()
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }
}

impl<C: Serialize> MatchState<C> {
    /// 64-bit digest of the full state.
    ///
    /// [`fold64`] over the bincode encoding. Two states with equal
    /// fingerprints are treated as identical when verifying replays.
    pub fn fingerprint(&self) -> Result<u64, bincode::Error> {
        let bytes = bincode::serialize(self)?;
        Ok(fold64(&bytes))
    }

    /// Full state as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

//! Core engine types: players, commands, events, state, RNG, configuration.
//!
//! This module contains the game-agnostic building blocks. Games plug their
//! own `Core` type into `MatchState` rather than modifying anything here.

pub mod player;
pub mod rng;
pub mod config;
pub mod command;
pub mod event;
pub mod error;
pub mod state;

pub use player::{PlayerId, PlayerMap};
pub use rng::{DiceRoll, GameRng, GameRngState};
pub use config::{
    HostConfig, MatchConfig, PhaseId, DEBUG_TOOLS_ENV, JOURNAL_LIMIT_ENV, QUEUE_DEPTH_ENV,
};
pub use command::{Command, CommandRecord};
pub use event::GameEvent;
pub use error::{EngineError, RejectionReason};
pub use state::MatchState;

//! # tabletop-engine
//!
//! A deterministic turn-based board game engine shared by independent
//! rulesets.
//!
//! ## Design Principles
//!
//! 1. **Pure Reducer**: `(MatchState, Command) -> (MatchState, Events)` or a
//!    typed rejection. No I/O, no clock, no ambient randomness. Replaying the
//!    same commands from the same state is bit-identical.
//!
//! 2. **Game-Agnostic**: Rulesets plug in through the `Game` trait: a `Core`
//!    type, a handler table, a phase list with guards, an event reducer and
//!    an optional log formatter. The engine never imports game logic.
//!
//! 3. **Presentation Decoupled**: Accepted events land in an append-only
//!    stream read through cursors, so slow clients never hold up the match.
//!
//! ## Modules
//!
//! - `core`: Players, RNG, configuration, commands, events, match state, errors
//! - `rules`: The `Game` trait, command handlers and the per-command context
//! - `flow`: Phase list, guards and the turn/phase state machine
//! - `processor`: `CommandProcessor`, the reducer
//! - `stream`: Event stream and reader cursors
//! - `actionlog`: Structured log entries, formatters and rendering
//! - `debug`: Debug-gated state patches and replay verification
//! - `host`: Match registry with one worker task per match
//! - `games`: Bundled rulesets

pub mod core;
pub mod rules;
pub mod flow;
pub mod processor;
pub mod stream;
pub mod actionlog;
pub mod debug;
pub mod host;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    Command, CommandRecord, EngineError, GameEvent, GameRng, GameRngState, HostConfig,
    MatchConfig, MatchState, PhaseId, PlayerId, PlayerMap, RejectionReason,
};

pub use crate::rules::{
    ActorRule, CommandContext, CommandHandler, Game, GameResult, HandlerTable,
};

pub use crate::flow::{FlowConfig, FlowGuard};

pub use crate::processor::CommandProcessor;

pub use crate::stream::{
    CursorTable, EventStream, EventStreamEntry, Journal, JournalEntry, StreamCursor,
};

pub use crate::actionlog::{
    ActionLog, ActionLogEntry, ActionLogFormatter, ActionLogSegment, FormatContext, Localizer,
    MessageCatalog,
};

pub use crate::debug::{DebugAccess, PatchError, ReplayError, ReplayOutcome};

pub use crate::host::{GameCatalog, HostedMatch, MatchId, MatchRegistry, MatchRuntime};

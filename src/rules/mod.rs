//! Ruleset extension contract.
//!
//! Games implement `Game` to define:
//! - Their `Core` state and initial setup
//! - Command handlers and the phases they run in
//! - How events fold into `Core`
//! - Win/loss conditions
//!
//! The command processor calls into `Game` but never interprets
//! game-specific concepts directly.

pub mod engine;
pub mod context;
pub mod handlers;

pub use engine::{Game, GameResult};
pub use context::CommandContext;
pub use handlers::{ActorRule, CommandHandler, HandlerFn, HandlerTable};

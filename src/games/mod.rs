//! Bundled rulesets.
//!
//! - `duel`: demonstration card and dice game
//! - `simple`: minimal counter game used to exercise the engine

pub mod duel;
pub mod simple;

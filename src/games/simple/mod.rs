//! Simple counter game for testing the engine.
//!
//! A minimal ruleset that touches every engine path:
//! - Phases `main1 -> main2 -> end`
//! - `SCORE`, `BUY` (spends tokens), `ROLL` (uses the match RNG)
//! - `CHEER` from any seat, `LOCK`/`UNLOCK` from the host only
//! - Optional `gateOpen` guard on leaving `main1`
//! - Optional target score that ends the match
//! - Optional phases that are left automatically
//!
//! Works with any player count.

mod game;

pub use game::{SimpleCore, SimpleGame, SimpleGameBuilder, PHASES};

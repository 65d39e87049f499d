//! Two-or-more player card and dice duel.
//!
//! Demonstrates every engine feature in one small ruleset.
//!
//! ## Turn
//!
//! `draw -> main1 -> combat -> main2 -> end`
//!
//! - `draw`: on entry the current player draws one card and gains energy
//! - `main1`/`main2`: `PLAY_CARD { cardId, targetPlayerId? }`
//! - `combat`: `ROLL_ATTACK { targetPlayerId? }` rolls three dice, then
//!   `RESOLVE_ATTACK` deals the highest die plus pair/triple bonuses.
//!   The `attackResolved` guard keeps the turn in combat until then
//!
//! Shields absorb damage before health. The last seat with health wins.

mod cards;
mod game;
mod log;

pub use cards::{card, CardDef, CardEffect, CARDS, STARTING_DECK};
pub use game::{
    attack_modifiers, AttackModifier, DuelCore, DuelGame, Fighter, PendingAttack, ATTACK_DICE,
    ENERGY_PER_TURN, MAX_ENERGY, MAX_HAND, OPENING_HAND, PHASES, PLAY_CARD, RESOLVE_ATTACK,
    ROLL_ATTACK, STARTING_ENERGY, STARTING_HEALTH,
};
pub use log::{duel_sources, message_catalog, DuelLog, NS};

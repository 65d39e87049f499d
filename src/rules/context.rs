//! Per-command transaction handed to handlers and phase hooks.
//!
//! A `CommandContext` owns a private working copy of the match state. Every
//! emitted event is stamped with the command's timestamp, reduced into the
//! working copy immediately and recorded, so later steps of the same command
//! observe earlier effects. The processor either commits the copy with its
//! events or drops both when any step rejects.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::command::Command;
use crate::core::error::RejectionReason;
use crate::core::event::GameEvent;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;
use crate::core::state::MatchState;
use crate::processor::system::SystemEvent;

/// Event reducer borrowed from the game for the lifetime of one command.
pub(crate) type Reducer<'a, C> = &'a (dyn Fn(&mut C, &GameEvent) + 'a);

/// Working state for one command.
pub struct CommandContext<'a, C> {
    reduce: Reducer<'a, C>,
    command: &'a Command,
    state: MatchState<C>,
    events: Vec<GameEvent>,
}

impl<'a, C> CommandContext<'a, C> {
    pub(crate) fn new(reduce: Reducer<'a, C>, command: &'a Command, state: MatchState<C>) -> Self {
        Self {
            reduce,
            command,
            state,
            events: Vec::new(),
        }
    }

    /// The command being processed.
    #[must_use]
    pub fn command(&self) -> &Command {
        self.command
    }

    /// Seat that issued the command.
    #[must_use]
    pub fn actor(&self) -> PlayerId {
        self.command.player_id
    }

    /// Decode the command payload.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, RejectionReason> {
        self.command.parse_payload()
    }

    /// Working state, including effects of events emitted so far.
    #[must_use]
    pub fn state(&self) -> &MatchState<C> {
        &self.state
    }

    /// Working `Core`.
    #[must_use]
    pub fn core(&self) -> &C {
        &self.state.core
    }

    /// The match RNG. Draws advance the working state's generator.
    pub fn rng(&mut self) -> &mut GameRng {
        &mut self.state.rng
    }

    /// Events emitted so far, in causal order.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Emit a game event with the given payload.
    pub fn emit(&mut self, event_type: impl Into<String>, payload: Value) {
        self.emit_event(GameEvent::new(event_type).with_payload(payload));
    }

    /// Emit a prepared event. Its timestamp is replaced by the command's.
    pub fn emit_event(&mut self, event: GameEvent) {
        let event = event.at(self.command.timestamp);
        (self.reduce)(&mut self.state.core, &event);
        self.events.push(event);
    }

    /// Emit an engine event after applying its envelope change.
    pub(crate) fn emit_system(&mut self, event: SystemEvent) {
        event.apply(&mut self.state);
        self.emit_event(event.to_event());
    }

    pub(crate) fn state_mut(&mut self) -> &mut MatchState<C> {
        &mut self.state
    }

    pub(crate) fn finish(self) -> (MatchState<C>, Vec<GameEvent>) {
        (self.state, self.events)
    }
}

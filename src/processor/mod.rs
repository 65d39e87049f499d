//! Command processor: the pure reducer at the center of every match.
//!
//! `apply(state, command)` returns the next state and the events the
//! command produced, or a typed rejection. It performs no I/O, never reads
//! a clock and draws randomness only from the state-carried RNG, so the
//! same initial state and command sequence always yield bit-identical
//! results.
//!
//! ## Validation order
//!
//! 1. Match already over -> `MatchOver`
//! 2. Issuer not seated -> `InvalidActor`
//! 3. Engine commands (`ADVANCE_PHASE`, `END_TURN`, `SET_READY`)
//! 4. Handler lookup -> `UnknownCommandType`
//! 5. Actor rule -> `NotYourTurn` / `InvalidActor`
//! 6. Phase restriction -> `InvalidPhase`
//! 7. The handler body
//!
//! Accepted commands are followed by automatic phase advances while the
//! game asks for them (`Game::auto_continue`), then the terminal check.
//!
//! Any rejection discards the working copy, leaving the input untouched.

pub mod system;

pub use system::SystemEvent;

use crate::core::command::Command;
use crate::core::config::MatchConfig;
use crate::core::error::{EngineError, RejectionReason};
use crate::core::event::GameEvent;
use crate::core::state::MatchState;
use crate::flow::{machine, FlowConfig, ADVANCE_PHASE, END_TURN, SET_READY};
use crate::rules::{ActorRule, CommandContext, Game, HandlerTable};

/// Outcome of an accepted command.
pub type Applied<C> = (MatchState<C>, Vec<GameEvent>);

/// Reducer for one ruleset.
///
/// Flow configuration and handler table are built once, at construction,
/// and reused for every command.
pub struct CommandProcessor<G: Game> {
    game: G,
    flow: FlowConfig<G::Core>,
    handlers: HandlerTable<G::Core>,
}

impl<G: Game> CommandProcessor<G> {
    /// Build the processor for a game.
    pub fn new(game: G) -> Self {
        let flow = game.flow();
        let handlers = game.handlers();
        Self {
            game,
            flow,
            handlers,
        }
    }

    /// The ruleset.
    #[must_use]
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Flow configuration.
    #[must_use]
    pub fn flow(&self) -> &FlowConfig<G::Core> {
        &self.flow
    }

    /// Handler table.
    #[must_use]
    pub fn handlers(&self) -> &HandlerTable<G::Core> {
        &self.handlers
    }

    /// Create the initial state: turn 1, first phase, starting player.
    ///
    /// ## Panics
    ///
    /// If `config` has no seats or more than 255. Configs built with
    /// [`MatchConfig::new`] never do; use [`Self::try_initial_state`] for
    /// deserialized ones.
    pub fn initial_state(&self, config: &MatchConfig) -> MatchState<G::Core> {
        let mut rng = crate::core::rng::GameRng::new(config.seed);
        let core = self.game.setup(config, &mut rng);
        let mut state = MatchState::new(core, config, self.flow.first_phase().clone());
        state.rng = rng;
        state
    }

    /// Validate `config`, then create the initial state.
    pub fn try_initial_state(
        &self,
        config: &MatchConfig,
    ) -> Result<MatchState<G::Core>, EngineError> {
        config.validate()?;
        Ok(self.initial_state(config))
    }

    /// Apply one command.
    pub fn apply(
        &self,
        state: &MatchState<G::Core>,
        command: &Command,
    ) -> Result<Applied<G::Core>, RejectionReason> {
        if state.is_over() {
            return Err(RejectionReason::MatchOver);
        }
        if !state.is_seated(command.player_id) {
            return Err(RejectionReason::InvalidActor);
        }

        let reduce = |core: &mut G::Core, event: &GameEvent| self.game.reduce(core, event);
        let mut ctx = CommandContext::new(&reduce, command, state.clone());

        match command.command_type.as_str() {
            ADVANCE_PHASE => {
                ActorRule::CurrentPlayer.check(state, command)?;
                machine::advance_phase(&self.game, &self.flow, &mut ctx)?;
            }
            END_TURN => {
                ActorRule::CurrentPlayer.check(state, command)?;
                machine::end_turn(&self.game, &self.flow, &mut ctx)?;
            }
            SET_READY => system::set_ready(&mut ctx)?,
            other => {
                let handler = self
                    .handlers
                    .get(other)
                    .ok_or(RejectionReason::UnknownCommandType)?;
                handler.check(state, command)?;
                handler.invoke(&mut ctx)?;
            }
        }

        machine::auto_advance(&self.game, &self.flow, &mut ctx)?;

        if let Some(result) = self.game.is_game_over(ctx.state()) {
            ctx.emit_system(SystemEvent::MatchEnded { result });
        }
        ctx.state_mut().command_count += 1;

        Ok(ctx.finish())
    }

    /// Check a command without keeping the result.
    pub fn validate(
        &self,
        state: &MatchState<G::Core>,
        command: &Command,
    ) -> Result<(), RejectionReason> {
        self.apply(state, command).map(|_| ())
    }
}

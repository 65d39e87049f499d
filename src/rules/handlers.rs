//! Command handler table.
//!
//! Games register one handler per command type. Each handler declares who
//! may issue the command and in which phases; the processor checks both
//! before running it, so handler bodies only contain game rules.
//!
//! ```
//! use tabletop_engine::rules::{CommandHandler, HandlerTable};
//!
//! let table: HandlerTable<u32> = HandlerTable::new()
//!     .with(CommandHandler::new("BUMP", |_ctx| Ok(())).during(&["main"]))
//!     .with(CommandHandler::new("CHAT", |_ctx| Ok(())).any_player());
//!
//! assert_eq!(table.len(), 2);
//! assert!(table.get("BUMP").is_some());
//! ```

use rustc_hash::FxHashMap;

use super::context::CommandContext;
use crate::core::command::Command;
use crate::core::config::PhaseId;
use crate::core::error::RejectionReason;
use crate::core::state::MatchState;
use crate::flow::is_engine_command;

/// Handler body.
pub type HandlerFn<C> =
    Box<dyn Fn(&mut CommandContext<'_, C>) -> Result<(), RejectionReason> + Send + Sync>;

/// Who may issue a command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActorRule {
    /// Only the current player.
    #[default]
    CurrentPlayer,
    /// Any seated player, on or off turn.
    AnyPlayer,
    /// Only the host seat.
    Host,
}

impl ActorRule {
    /// Check the issuing seat against this rule.
    pub fn check<C>(self, state: &MatchState<C>, command: &Command) -> Result<(), RejectionReason> {
        match self {
            ActorRule::CurrentPlayer if command.player_id != state.current_player() => {
                Err(RejectionReason::NotYourTurn)
            }
            ActorRule::Host if command.player_id != state.host_player_id() => {
                Err(RejectionReason::InvalidActor)
            }
            _ => Ok(()),
        }
    }
}

/// Handler for one command type.
pub struct CommandHandler<C> {
    command_type: String,
    actor: ActorRule,
    phases: Option<Vec<PhaseId>>,
    run: HandlerFn<C>,
}

impl<C> CommandHandler<C> {
    /// Create a handler restricted to the current player in any phase.
    pub fn new<F>(command_type: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut CommandContext<'_, C>) -> Result<(), RejectionReason> + Send + Sync + 'static,
    {
        Self {
            command_type: command_type.into(),
            actor: ActorRule::CurrentPlayer,
            phases: None,
            run: Box::new(run),
        }
    }

    /// Allow any seated player (builder pattern).
    #[must_use]
    pub fn any_player(mut self) -> Self {
        self.actor = ActorRule::AnyPlayer;
        self
    }

    /// Allow only the host seat (builder pattern).
    #[must_use]
    pub fn host_only(mut self) -> Self {
        self.actor = ActorRule::Host;
        self
    }

    /// Restrict to the given phases (builder pattern).
    #[must_use]
    pub fn during(mut self, phases: &[&str]) -> Self {
        self.phases = Some(phases.iter().map(|p| PhaseId::new(*p)).collect());
        self
    }

    /// Command type this handler serves.
    #[must_use]
    pub fn command_type(&self) -> &str {
        &self.command_type
    }

    /// Actor rule.
    #[must_use]
    pub fn actor(&self) -> ActorRule {
        self.actor
    }

    /// Whether the handler accepts commands in `phase`.
    #[must_use]
    pub fn allows_phase(&self, phase: &PhaseId) -> bool {
        self.phases
            .as_ref()
            .map_or(true, |phases| phases.contains(phase))
    }

    /// Actor then phase checks, in that order.
    pub fn check(&self, state: &MatchState<C>, command: &Command) -> Result<(), RejectionReason> {
        self.actor.check(state, command)?;
        if !self.allows_phase(state.phase()) {
            return Err(RejectionReason::InvalidPhase);
        }
        Ok(())
    }

    /// Run the handler body.
    pub fn invoke(&self, ctx: &mut CommandContext<'_, C>) -> Result<(), RejectionReason> {
        (self.run)(ctx)
    }
}

impl<C> std::fmt::Debug for CommandHandler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("command_type", &self.command_type)
            .field("actor", &self.actor)
            .field("phases", &self.phases)
            .finish_non_exhaustive()
    }
}

/// Command type -> handler, built once per match.
pub struct HandlerTable<C> {
    handlers: FxHashMap<String, CommandHandler<C>>,
}

impl<C> Default for HandlerTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> HandlerTable<C> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register a handler (builder pattern).
    #[must_use]
    pub fn with(mut self, handler: CommandHandler<C>) -> Self {
        self.register(handler);
        self
    }

    /// Register a handler.
    ///
    /// Panics on a duplicate type or an engine-owned type
    /// (`ADVANCE_PHASE`, `END_TURN`, `SET_READY`).
    pub fn register(&mut self, handler: CommandHandler<C>) {
        assert!(
            !is_engine_command(handler.command_type()),
            "Command type {} is owned by the engine",
            handler.command_type()
        );
        assert!(
            !self.handlers.contains_key(handler.command_type()),
            "Duplicate handler for command type {}",
            handler.command_type()
        );
        self.handlers
            .insert(handler.command_type().to_string(), handler);
    }

    /// Look up a handler.
    #[must_use]
    pub fn get(&self, command_type: &str) -> Option<&CommandHandler<C>> {
        self.handlers.get(command_type)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered command types, sorted.
    #[must_use]
    pub fn command_types(&self) -> Vec<&str> {
        let mut types: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MatchConfig;
    use crate::core::player::PlayerId;

    fn state() -> MatchState<()> {
        MatchState::new((), &MatchConfig::new(2).with_host(PlayerId::new(1)), PhaseId::new("main1"))
    }

    fn noop() -> CommandHandler<()> {
        CommandHandler::new("NOOP", |_ctx| Ok(()))
    }

    #[test]
    fn test_current_player_rule() {
        let state = state();
        let handler = noop();

        assert!(handler.check(&state, &Command::new("NOOP", PlayerId::new(0))).is_ok());
        assert_eq!(
            handler.check(&state, &Command::new("NOOP", PlayerId::new(1))),
            Err(RejectionReason::NotYourTurn)
        );
    }

    #[test]
    fn test_host_rule() {
        let state = state();
        let handler = noop().host_only();

        assert_eq!(
            handler.check(&state, &Command::new("NOOP", PlayerId::new(0))),
            Err(RejectionReason::InvalidActor)
        );
        assert!(handler.check(&state, &Command::new("NOOP", PlayerId::new(1))).is_ok());
    }

    #[test]
    fn test_phase_restriction_checked_after_actor() {
        let state = state();
        let handler = noop().during(&["combat"]);

        assert_eq!(
            handler.check(&state, &Command::new("NOOP", PlayerId::new(1))),
            Err(RejectionReason::NotYourTurn)
        );
        assert_eq!(
            handler.check(&state, &Command::new("NOOP", PlayerId::new(0))),
            Err(RejectionReason::InvalidPhase)
        );

        let anyone = noop().any_player().during(&["main1"]);
        assert!(anyone.check(&state, &Command::new("NOOP", PlayerId::new(1))).is_ok());
    }

    #[test]
    fn test_table_lookup() {
        let table = HandlerTable::new()
            .with(noop())
            .with(CommandHandler::new("ALPHA", |_ctx| Ok(())));

        assert_eq!(table.command_types(), vec!["ALPHA", "NOOP"]);
        assert!(table.get("MISSING").is_none());
        assert!(!table.is_empty());
    }

    #[test]
    #[should_panic(expected = "Duplicate handler")]
    fn test_duplicate_handler_panics() {
        let _ = HandlerTable::new().with(noop()).with(noop());
    }

    #[test]
    #[should_panic(expected = "owned by the engine")]
    fn test_engine_command_panics() {
        let _: HandlerTable<()> =
            HandlerTable::new().with(CommandHandler::new("END_TURN", |_ctx| Ok(())));
    }
}

//! A single hosted match.
//!
//! `HostedMatch` owns everything one match needs: the processor (handlers
//! and flow built once), the live and initial states, the accepted command
//! log, the event stream, persisted reader cursors, the action log and a
//! bounded raw journal. It is synchronous; the worker in `host::worker`
//! gives it a queue.

use serde_json::Value;
use tracing::{debug, info};

use super::MatchId;
use crate::actionlog::{ActionLog, ActionLogEntry, FormatContext};
use crate::core::command::{Command, CommandRecord};
use crate::core::config::{HostConfig, MatchConfig};
use crate::core::error::{EngineError, RejectionReason};
use crate::core::state::MatchState;
use crate::debug::{self, DebugAccess, ReplayError};
use crate::processor::CommandProcessor;
use crate::rules::Game;
use crate::stream::{CursorTable, EventStream, EventStreamEntry, Journal, JournalEntry};

/// One live match of game `G`.
pub struct HostedMatch<G: Game> {
    id: MatchId,
    processor: CommandProcessor<G>,
    initial: MatchState<G::Core>,
    state: MatchState<G::Core>,
    commands: Vec<CommandRecord>,
    stream: EventStream,
    cursors: CursorTable,
    log: ActionLog,
    journal: Journal,
    debug: Option<DebugAccess>,
}

impl<G: Game> HostedMatch<G> {
    /// Start a match.
    ///
    /// Panics if `config` has no seats or more than 255. The registry runs
    /// [`MatchConfig::validate`] before calling this.
    pub fn new(id: MatchId, game: G, config: &MatchConfig, host: &HostConfig) -> Self {
        let processor = CommandProcessor::new(game);
        let initial = processor.initial_state(config);
        info!(
            match_id = %id,
            game = processor.game().id(),
            players = config.player_count,
            seed = config.seed,
            "match created"
        );

        Self {
            id,
            processor,
            state: initial.clone(),
            initial,
            commands: Vec::new(),
            stream: EventStream::new(),
            cursors: CursorTable::new(),
            log: ActionLog::new(),
            journal: Journal::new(host.journal_limit),
            debug: DebugAccess::grant(host),
        }
    }

    /// Match id.
    #[must_use]
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// The processor.
    #[must_use]
    pub fn processor(&self) -> &CommandProcessor<G> {
        &self.processor
    }

    /// Apply a command and append its events to the stream.
    ///
    /// Rejections change nothing and append nothing.
    pub fn submit(&mut self, command: Command) -> Result<Vec<EventStreamEntry>, RejectionReason> {
        let (next, events) = match self.processor.apply(&self.state, &command) {
            Ok(applied) => applied,
            Err(reason) => {
                debug!(
                    match_id = %self.id,
                    command = %command.command_type,
                    player = %command.player_id,
                    %reason,
                    "command rejected"
                );
                return Err(reason);
            }
        };

        if let Some(formatter) = self.processor.game().action_log() {
            let ctx = FormatContext::new(&command, &events, &next);
            self.log.extend(formatter.format(&ctx));
        }

        self.journal.record(&command, &events);
        let was_over = self.state.is_over();
        self.state = next;
        let entries = self.stream.append(events);
        debug!(
            match_id = %self.id,
            command = %command.command_type,
            player = %command.player_id,
            events = entries.len(),
            latest = self.stream.latest_id(),
            "command accepted"
        );
        self.commands.push(CommandRecord::new(
            self.state.command_count(),
            self.state.turn_number(),
            command,
        ));

        if !was_over {
            if let Some(result) = self.state.game_over() {
                info!(match_id = %self.id, ?result, "match ended");
            }
        }
        Ok(entries)
    }

    /// Stream entries after `cursor`.
    #[must_use]
    pub fn read_since(&self, cursor: u64) -> Vec<EventStreamEntry> {
        self.stream.read_since(cursor)
    }

    /// Live state.
    #[must_use]
    pub fn state(&self) -> &MatchState<G::Core> {
        &self.state
    }

    /// Replay baseline.
    #[must_use]
    pub fn initial_state(&self) -> &MatchState<G::Core> {
        &self.initial
    }

    /// Accepted commands since the replay baseline.
    #[must_use]
    pub fn commands(&self) -> &[CommandRecord] {
        &self.commands
    }

    /// The event stream.
    #[must_use]
    pub fn stream(&self) -> &EventStream {
        &self.stream
    }

    /// Persisted reader cursors.
    #[must_use]
    pub fn cursors(&self) -> &CursorTable {
        &self.cursors
    }

    /// Record a reader's position. Returns the stored position.
    pub fn commit_cursor(&mut self, reader: &str, position: u64) -> u64 {
        let position = position.min(self.stream.latest_id());
        self.cursors.commit(reader, position)
    }

    /// The action log.
    #[must_use]
    pub fn action_log(&self) -> &ActionLog {
        &self.log
    }

    /// Raw journal of recent commands and events.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Deep-merge a JSON object into `Core`.
    ///
    /// The patched state becomes the new replay baseline, since the command
    /// log alone can no longer reproduce it.
    pub fn patch_core(&mut self, patch: &Value) -> Result<&MatchState<G::Core>, EngineError> {
        let access = self.debug.as_ref().ok_or(EngineError::DebugDisabled)?;
        let next = debug::patch_core(access, &self.state, patch)
            .map_err(|e| EngineError::Patch(e.to_string()))?;

        info!(match_id = %self.id, "core patched through debug tools");
        self.state = next;
        self.initial = self.state.clone();
        self.commands.clear();
        Ok(&self.state)
    }

    /// Replay the command log from the baseline and compare with the live state.
    pub fn verify_replay(&self) -> Result<u64, ReplayError> {
        let commands: Vec<Command> = self.commands.iter().map(|r| r.command.clone()).collect();
        debug::verify_replay(&self.processor, &self.initial, &commands, &self.state)
    }
}

/// Object-safe, JSON-facing view of a hosted match.
///
/// Lets one registry hold matches of different games.
pub trait MatchRuntime: Send {
    /// Match id.
    fn id(&self) -> &MatchId;

    /// Game id.
    fn game_id(&self) -> &'static str;

    /// Apply a command.
    fn submit(&mut self, command: Command) -> Result<Vec<EventStreamEntry>, RejectionReason>;

    /// Snapshot of the event stream.
    fn stream(&self) -> EventStream;

    /// Live state as JSON.
    fn state_json(&self) -> Result<Value, EngineError>;

    /// Action-log entries, oldest first.
    fn action_log(&self) -> Vec<ActionLogEntry>;

    /// Raw journal entries, oldest first.
    fn journal(&self) -> Vec<JournalEntry>;

    /// Deep-merge a patch into `Core`, returning the new state as JSON.
    fn patch_json(&mut self, patch: &Value) -> Result<Value, EngineError>;

    /// Record a reader's position.
    fn commit_cursor(&mut self, reader: &str, position: u64) -> u64;

    /// Stored position of a reader.
    fn cursor(&self, reader: &str) -> u64;

    /// Replay check.
    fn verify_replay(&self) -> Result<u64, ReplayError>;

    /// Whether the match has ended.
    fn is_over(&self) -> bool;
}

impl<G: Game> MatchRuntime for HostedMatch<G> {
    fn id(&self) -> &MatchId {
        &self.id
    }

    fn game_id(&self) -> &'static str {
        self.processor.game().id()
    }

    fn submit(&mut self, command: Command) -> Result<Vec<EventStreamEntry>, RejectionReason> {
        HostedMatch::submit(self, command)
    }

    fn stream(&self) -> EventStream {
        self.stream.clone()
    }

    fn state_json(&self) -> Result<Value, EngineError> {
        Ok(self.state.to_json()?)
    }

    fn action_log(&self) -> Vec<ActionLogEntry> {
        self.log.entries()
    }

    fn journal(&self) -> Vec<JournalEntry> {
        self.journal.entries()
    }

    fn patch_json(&mut self, patch: &Value) -> Result<Value, EngineError> {
        let state = self.patch_core(patch)?;
        Ok(state.to_json()?)
    }

    fn commit_cursor(&mut self, reader: &str, position: u64) -> u64 {
        HostedMatch::commit_cursor(self, reader, position)
    }

    fn cursor(&self, reader: &str) -> u64 {
        self.cursors.get(reader)
    }

    fn verify_replay(&self) -> Result<u64, ReplayError> {
        HostedMatch::verify_replay(self)
    }

    fn is_over(&self) -> bool {
        self.state.is_over()
    }
}

//! Per-game formatting of accepted commands into log entries.

use im::Vector;

use super::segment::{ActionLogEntry, ActionLogSegment};
use crate::core::command::Command;
use crate::core::event::GameEvent;
use crate::core::state::MatchState;

/// Everything a formatter may look at for one accepted command.
pub struct FormatContext<'a, C> {
    /// The accepted command.
    pub command: &'a Command,
    /// Events it produced, in order.
    pub events: &'a [GameEvent],
    /// State after the command.
    pub state: &'a MatchState<C>,
    /// Accepted-command count after the command.
    pub sequence: u64,
}

impl<'a, C> FormatContext<'a, C> {
    /// Build a context from the post-command state.
    pub fn new(command: &'a Command, events: &'a [GameEvent], state: &'a MatchState<C>) -> Self {
        Self {
            command,
            events,
            state,
            sequence: state.command_count(),
        }
    }

    /// Deterministic entry id for the `index`-th entry of this command.
    #[must_use]
    pub fn entry_id(&self, index: usize) -> String {
        format!("{}-{}", self.sequence, index)
    }

    /// Entry stamped with this command's id, time and actor.
    pub fn entry(
        &self,
        index: usize,
        kind: impl Into<String>,
        segments: Vec<ActionLogSegment>,
    ) -> ActionLogEntry {
        ActionLogEntry {
            id: self.entry_id(index),
            timestamp: self.command.timestamp,
            actor_id: self.command.player_id,
            kind: kind.into(),
            segments,
        }
    }

    /// First event of the given type.
    #[must_use]
    pub fn find_event(&self, event_type: &str) -> Option<&'a GameEvent> {
        self.events.iter().find(|e| e.is(event_type))
    }

    /// Every event of the given type.
    pub fn events_of<'s>(&'s self, event_type: &'s str) -> impl Iterator<Item = &'a GameEvent> + 's {
        self.events.iter().filter(move |e| e.is(event_type))
    }
}

/// Turns an accepted command into zero or more log entries.
///
/// Must be pure: the same context always yields the same entries. An empty
/// result means the command is not logged.
pub trait ActionLogFormatter<C>: Send + Sync {
    /// Format one command.
    fn format(&self, ctx: &FormatContext<'_, C>) -> Vec<ActionLogEntry>;
}

impl<C, F> ActionLogFormatter<C> for F
where
    F: Fn(&FormatContext<'_, C>) -> Vec<ActionLogEntry> + Send + Sync,
{
    fn format(&self, ctx: &FormatContext<'_, C>) -> Vec<ActionLogEntry> {
        self(ctx)
    }
}

/// Ordered, append-only log of one match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionLog {
    entries: Vector<ActionLogEntry>,
}

impl ActionLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append entries in order.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = ActionLogEntry>) {
        self.entries.extend(entries);
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<ActionLogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Entry by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ActionLogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Iterate over entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MatchConfig, PhaseId};
    use crate::core::player::PlayerId;

    fn formatter(ctx: &FormatContext<'_, ()>) -> Vec<ActionLogEntry> {
        ctx.events_of("PING")
            .enumerate()
            .map(|(i, _)| ctx.entry(i, "ping", vec![ActionLogSegment::text("ping")]))
            .collect()
    }

    #[test]
    fn test_entry_ids_use_sequence() {
        let mut state = MatchState::new((), &MatchConfig::new(2), PhaseId::new("main"));
        state.command_count = 4;
        let command = Command::new("PING", PlayerId::new(1)).at(99);
        let events = vec![GameEvent::new("PING"), GameEvent::new("OTHER"), GameEvent::new("PING")];

        let ctx = FormatContext::new(&command, &events, &state);
        let entries = formatter.format(&ctx);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "4-0");
        assert_eq!(entries[1].id, "4-1");
        assert_eq!(entries[0].timestamp, 99);
        assert_eq!(entries[0].actor_id, PlayerId::new(1));
        assert_eq!(ctx.find_event("OTHER").map(|e| e.event_type.as_str()), Some("OTHER"));
    }

    #[test]
    fn test_action_log_store() {
        let mut log = ActionLog::new();
        assert!(log.is_empty());

        let entry = ActionLogEntry {
            id: "1-0".into(),
            timestamp: 1,
            actor_id: PlayerId::new(0),
            kind: "ping".into(),
            segments: Vec::new(),
        };
        log.extend(vec![entry.clone()]);

        assert_eq!(log.len(), 1);
        assert_eq!(log.get("1-0"), Some(&entry));
        assert_eq!(log.entries(), vec![entry]);
    }
}

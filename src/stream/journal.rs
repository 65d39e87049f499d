//! Bounded raw journal of accepted commands and their events.
//!
//! Unlike the event stream, the journal forgets: once it holds
//! `max_entries` entries, each new entry drops the oldest one. It is an
//! audit and debugging aid, never a replay source.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::command::Command;
use crate::core::event::GameEvent;

/// Default journal capacity.
pub const DEFAULT_JOURNAL_LIMIT: usize = 1000;

/// One journal line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum JournalRecord {
    /// An accepted command.
    Command(Command),
    /// An event the command produced.
    Event(GameEvent),
}

/// A journal line with its time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: u64,
    #[serde(flatten)]
    pub record: JournalRecord,
}

impl JournalEntry {
    /// Whether this line records a command.
    #[must_use]
    pub fn is_command(&self) -> bool {
        matches!(self.record, JournalRecord::Command(_))
    }
}

/// Command and event journal capped at `max_entries`.
#[derive(Clone, Debug, PartialEq)]
pub struct Journal {
    entries: Vector<JournalEntry>,
    max_entries: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_LIMIT)
    }
}

impl Journal {
    /// Create an empty journal. A limit of 0 keeps nothing.
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vector::new(),
            max_entries,
        }
    }

    /// Record an accepted command followed by its events.
    pub fn record(&mut self, command: &Command, events: &[GameEvent]) {
        self.push(JournalEntry {
            timestamp: command.timestamp,
            record: JournalRecord::Command(command.clone()),
        });
        for event in events {
            self.push(JournalEntry {
                timestamp: event.timestamp,
                record: JournalRecord::Event(event.clone()),
            });
        }
    }

    fn push(&mut self, entry: JournalEntry) {
        if self.max_entries == 0 {
            return;
        }
        while self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Recorded commands still in the journal, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<&Command> {
        self.entries
            .iter()
            .filter_map(|e| match &e.record {
                JournalRecord::Command(command) => Some(command),
                JournalRecord::Event(_) => None,
            })
            .collect()
    }

    /// Recorded events of one type, oldest first.
    #[must_use]
    pub fn events_of<'a>(&'a self, event_type: &'a str) -> impl Iterator<Item = &'a GameEvent> + 'a {
        self.entries.iter().filter_map(move |e| match &e.record {
            JournalRecord::Event(event) if event.is(event_type) => Some(event),
            _ => None,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity.
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;
    use serde_json::json;

    fn command(timestamp: u64) -> Command {
        Command::new("SCORE", PlayerId::new(0)).at(timestamp)
    }

    fn event(event_type: &str, timestamp: u64) -> GameEvent {
        let mut event = GameEvent::new(event_type);
        event.timestamp = timestamp;
        event
    }

    #[test]
    fn test_command_then_events() {
        let mut journal = Journal::default();
        journal.record(&command(5), &[event("A", 5), event("B", 5)]);

        let entries = journal.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_command());
        assert!(!entries[1].is_command());
        assert_eq!(journal.commands().len(), 1);
        assert_eq!(journal.events_of("B").count(), 1);
        assert_eq!(journal.max_entries(), DEFAULT_JOURNAL_LIMIT);
    }

    #[test]
    fn test_oldest_entries_are_dropped() {
        let mut journal = Journal::new(4);
        for t in 1..=3 {
            journal.record(&command(t), &[event("A", t)]);
        }

        assert_eq!(journal.len(), 4);
        let times: Vec<u64> = journal.entries().iter().map(|e| e.timestamp).collect();
        assert_eq!(times, vec![2, 2, 3, 3]);
        assert_eq!(journal.commands().len(), 2);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut journal = Journal::new(0);
        journal.record(&command(1), &[event("A", 1)]);
        assert!(journal.is_empty());
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = JournalEntry {
            timestamp: 7,
            record: JournalRecord::Event(event("A", 7)),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], json!("event"));
        assert_eq!(json["timestamp"], json!(7));
        assert_eq!(json["data"]["type"], json!("A"));
    }
}

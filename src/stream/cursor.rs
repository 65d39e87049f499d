//! Reader cursors over an event stream.
//!
//! A cursor is the id of the last entry a reader has consumed; 0 means
//! nothing consumed. Cursors only move forward. Readers must tolerate
//! re-delivery after a restart from a persisted cursor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::log::{EventStream, EventStreamEntry};

/// Reader-local cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCursor {
    position: u64,
}

impl StreamCursor {
    /// Cursor at the start of the stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor resuming after `position`.
    #[must_use]
    pub fn at(position: u64) -> Self {
        Self { position }
    }

    /// Id of the last consumed entry.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read every new entry and move past it.
    pub fn consume(&mut self, stream: &EventStream) -> Vec<EventStreamEntry> {
        let entries = stream.read_since(self.position);
        if let Some(last) = entries.last() {
            self.position = last.id;
        }
        entries
    }

    /// Skip everything already in the stream (e.g. on reconnect).
    pub fn reset_to_latest(&mut self, stream: &EventStream) {
        self.position = self.position.max(stream.latest_id());
    }

    /// Move to `position` if it is ahead of the current one.
    pub fn seek(&mut self, position: u64) {
        self.position = self.position.max(position);
    }
}

/// Named cursors persisted per match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorTable {
    cursors: BTreeMap<String, u64>,
}

impl CursorTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored position for `reader`, 0 if unknown.
    #[must_use]
    pub fn get(&self, reader: &str) -> u64 {
        self.cursors.get(reader).copied().unwrap_or(0)
    }

    /// Record that `reader` consumed up to `position`.
    ///
    /// Lower values than the stored one are ignored. Returns the stored
    /// position after the commit.
    pub fn commit(&mut self, reader: &str, position: u64) -> u64 {
        let slot = self.cursors.entry(reader.to_string()).or_insert(0);
        *slot = (*slot).max(position);
        *slot
    }

    /// Forget a reader.
    pub fn remove(&mut self, reader: &str) -> Option<u64> {
        self.cursors.remove(reader)
    }

    /// Iterate over (reader, position) pairs, ordered by reader name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.cursors.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of known readers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// True if no reader is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::GameEvent;

    fn stream(n: usize) -> EventStream {
        let mut stream = EventStream::new();
        stream.append((0..n).map(|i| GameEvent::new(format!("E{i}"))).collect());
        stream
    }

    #[test]
    fn test_consume_moves_forward() {
        let mut live = stream(2);
        let mut cursor = StreamCursor::new();

        assert_eq!(cursor.consume(&live).len(), 2);
        assert_eq!(cursor.position(), 2);
        assert!(cursor.consume(&live).is_empty());

        live.append(vec![GameEvent::new("E2")]);
        let next = cursor.consume(&live);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, 3);
    }

    #[test]
    fn test_reset_to_latest() {
        let live = stream(4);
        let mut cursor = StreamCursor::at(1);

        cursor.reset_to_latest(&live);
        assert_eq!(cursor.position(), 4);
        assert!(cursor.consume(&live).is_empty());
    }

    #[test]
    fn test_seek_never_moves_back() {
        let mut cursor = StreamCursor::at(5);
        cursor.seek(3);
        assert_eq!(cursor.position(), 5);
        cursor.seek(8);
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn test_cursor_table_commit() {
        let mut table = CursorTable::new();

        assert_eq!(table.get("animation"), 0);
        assert_eq!(table.commit("animation", 4), 4);
        assert_eq!(table.commit("animation", 2), 4);
        assert_eq!(table.commit("audio", 1), 1);

        let readers: Vec<_> = table.iter().collect();
        assert_eq!(readers, vec![("animation", 4), ("audio", 1)]);

        assert_eq!(table.remove("audio"), Some(1));
        assert_eq!(table.len(), 1);
    }
}

//! Append-only event stream for one match.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::event::GameEvent;

/// One numbered stream entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventStreamEntry {
    /// Position in the stream, starting at 1.
    pub id: u64,
    /// The event.
    pub event: GameEvent,
    /// Timestamp of the event (the producing command's timestamp).
    pub timestamp: u64,
}

/// Append-only, monotonically numbered event log.
///
/// Backed by a persistent vector: `clone()` is O(1) and yields an immutable
/// snapshot that readers can hold while the live stream keeps growing.
///
/// ```
/// use tabletop_engine::core::GameEvent;
/// use tabletop_engine::stream::EventStream;
///
/// let mut stream = EventStream::new();
/// stream.append(vec![GameEvent::new("A"), GameEvent::new("B")]);
///
/// let snapshot = stream.clone();
/// stream.append(vec![GameEvent::new("C")]);
///
/// assert_eq!(snapshot.len(), 2);
/// assert_eq!(stream.read_since(1).len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventStream {
    entries: Vector<EventStreamEntry>,
}

impl EventStream {
    /// Create an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append events in order, returning the new entries.
    pub fn append(&mut self, events: Vec<GameEvent>) -> Vec<EventStreamEntry> {
        let mut appended = Vec::with_capacity(events.len());
        for event in events {
            let entry = EventStreamEntry {
                id: self.latest_id() + 1,
                timestamp: event.timestamp,
                event,
            };
            self.entries.push_back(entry.clone());
            appended.push(entry);
        }
        appended
    }

    /// Every entry with `id > cursor`, in order.
    ///
    /// Cursor 0 reads the whole stream. A cursor past the end reads nothing.
    #[must_use]
    pub fn read_since(&self, cursor: u64) -> Vec<EventStreamEntry> {
        let start = usize::try_from(cursor).unwrap_or(usize::MAX);
        if start >= self.entries.len() {
            return Vec::new();
        }
        self.entries.skip(start).into_iter().collect()
    }

    /// Entry with the given id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&EventStreamEntry> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.entries.get(index)
    }

    /// Id of the newest entry, or 0 when empty.
    #[must_use]
    pub fn latest_id(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &EventStreamEntry> {
        self.entries.iter()
    }
}

//! Event stream and reader cursors.
//!
//! Every accepted command appends its events to the match's stream in
//! emission order. Presentation consumers (animation, audio, log views)
//! read the stream at their own pace through cursors, so a slow reader
//! never holds up command processing.
//!
//! - `EventStream`: append-only log, ids contiguous from 1, O(1) snapshots
//! - `StreamCursor`: reader-local position
//! - `CursorTable`: named positions persisted with the match
//! - `Journal`: bounded raw record of commands and events for auditing

pub mod log;
pub mod cursor;
pub mod journal;

pub use log::{EventStream, EventStreamEntry};
pub use cursor::{CursorTable, StreamCursor};
pub use journal::{Journal, JournalEntry, JournalRecord, DEFAULT_JOURNAL_LIMIT};

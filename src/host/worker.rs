//! Per-match worker task.
//!
//! Each match runs on its own tokio task and drains a bounded mpsc queue,
//! so commands for one match are applied strictly one at a time while
//! different matches proceed in parallel. After every change the worker
//! publishes fresh stream and state snapshots on `watch` channels; readers
//! use those and never wait on the queue.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::hosted::MatchRuntime;
use super::MatchId;
use crate::actionlog::ActionLogEntry;
use crate::core::command::Command;
use crate::core::error::{EngineError, RejectionReason};
use crate::debug::ReplayError;
use crate::stream::{EventStream, EventStreamEntry, JournalEntry};

type Reply<T> = oneshot::Sender<T>;

/// Work items for a match worker.
pub(crate) enum MatchRequest {
    Submit {
        command: Command,
        reply: Reply<Result<Vec<EventStreamEntry>, RejectionReason>>,
    },
    ActionLog {
        reply: Reply<Vec<ActionLogEntry>>,
    },
    Journal {
        reply: Reply<Vec<JournalEntry>>,
    },
    Patch {
        patch: Value,
        reply: Reply<Result<Value, EngineError>>,
    },
    CommitCursor {
        reader: String,
        position: u64,
        reply: Reply<u64>,
    },
    Cursor {
        reader: String,
        reply: Reply<u64>,
    },
    Verify {
        reply: Reply<Result<u64, ReplayError>>,
    },
}

/// Handle to a running match worker.
pub(crate) struct MatchHandle {
    pub(crate) game_id: &'static str,
    pub(crate) sender: mpsc::Sender<MatchRequest>,
    pub(crate) stream: watch::Receiver<EventStream>,
    pub(crate) state: watch::Receiver<Value>,
    pub(crate) task: JoinHandle<()>,
}

/// Spawn the worker for one match.
pub(crate) fn spawn(runtime: Box<dyn MatchRuntime>, queue_depth: usize) -> MatchHandle {
    let (sender, receiver) = mpsc::channel(queue_depth.max(1));
    let (stream_tx, stream_rx) = watch::channel(runtime.stream());
    let (state_tx, state_rx) = watch::channel(initial_state_json(runtime.as_ref()));
    let game_id = runtime.game_id();

    let task = tokio::spawn(run(runtime, receiver, stream_tx, state_tx));

    MatchHandle {
        game_id,
        sender,
        stream: stream_rx,
        state: state_rx,
        task,
    }
}

fn initial_state_json(runtime: &dyn MatchRuntime) -> Value {
    runtime.state_json().unwrap_or_else(|e| {
        warn!(match_id = %runtime.id(), error = %e, "could not encode initial state");
        Value::Null
    })
}

async fn run(
    mut runtime: Box<dyn MatchRuntime>,
    mut receiver: mpsc::Receiver<MatchRequest>,
    stream_tx: watch::Sender<EventStream>,
    state_tx: watch::Sender<Value>,
) {
    let match_id: MatchId = runtime.id().clone();
    debug!(%match_id, "match worker started");

    while let Some(request) = receiver.recv().await {
        match request {
            MatchRequest::Submit { command, reply } => {
                let result = runtime.submit(command);
                if result.is_ok() {
                    publish(runtime.as_ref(), &stream_tx, &state_tx);
                }
                let _ = reply.send(result);
            }
            MatchRequest::ActionLog { reply } => {
                let _ = reply.send(runtime.action_log());
            }
            MatchRequest::Journal { reply } => {
                let _ = reply.send(runtime.journal());
            }
            MatchRequest::Patch { patch, reply } => {
                let result = runtime.patch_json(&patch);
                if result.is_ok() {
                    publish(runtime.as_ref(), &stream_tx, &state_tx);
                }
                let _ = reply.send(result);
            }
            MatchRequest::CommitCursor {
                reader,
                position,
                reply,
            } => {
                let _ = reply.send(runtime.commit_cursor(&reader, position));
            }
            MatchRequest::Cursor { reader, reply } => {
                let _ = reply.send(runtime.cursor(&reader));
            }
            MatchRequest::Verify { reply } => {
                let _ = reply.send(runtime.verify_replay());
            }
        }
    }

    debug!(%match_id, "match worker stopped");
}

fn publish(
    runtime: &dyn MatchRuntime,
    stream_tx: &watch::Sender<EventStream>,
    state_tx: &watch::Sender<Value>,
) {
    stream_tx.send_replace(runtime.stream());
    match runtime.state_json() {
        Ok(state) => {
            state_tx.send_replace(state);
        }
        Err(e) => warn!(match_id = %runtime.id(), error = %e, "could not publish state snapshot"),
    }
}

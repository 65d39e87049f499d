//! Command replay and determinism checks.

use thiserror::Error;

use crate::core::command::Command;
use crate::core::error::RejectionReason;
use crate::core::event::GameEvent;
use crate::core::state::MatchState;
use crate::processor::CommandProcessor;
use crate::rules::Game;

/// Final state and every event produced by a replay.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayOutcome<C> {
    /// State after the last command.
    pub state: MatchState<C>,
    /// Events in emission order.
    pub events: Vec<GameEvent>,
}

/// Replay failures.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A command was rejected; nothing after it was applied.
    #[error("command {index} ({command_type}) rejected: {reason}")]
    Rejected {
        /// Position of the failing command.
        index: usize,
        /// Its type.
        command_type: String,
        /// Why it was rejected.
        reason: RejectionReason,
    },

    /// The replayed state differs from the expected one.
    #[error("replay diverged: expected fingerprint {expected:#018x}, got {actual:#018x}")]
    Diverged {
        /// Fingerprint of the expected state.
        expected: u64,
        /// Fingerprint of the replayed state.
        actual: u64,
    },

    /// A state could not be encoded for fingerprinting.
    #[error("fingerprint failed: {0}")]
    Fingerprint(#[from] bincode::Error),
}

/// Apply `commands` in order starting from `initial`.
pub fn replay<G: Game>(
    processor: &CommandProcessor<G>,
    initial: &MatchState<G::Core>,
    commands: &[Command],
) -> Result<ReplayOutcome<G::Core>, ReplayError> {
    let mut state = initial.clone();
    let mut events = Vec::new();

    for (index, command) in commands.iter().enumerate() {
        let (next, produced) =
            processor
                .apply(&state, command)
                .map_err(|reason| ReplayError::Rejected {
                    index,
                    command_type: command.command_type.clone(),
                    reason,
                })?;
        state = next;
        events.extend(produced);
    }

    Ok(ReplayOutcome { state, events })
}

/// Replay and check the result against `expected`.
///
/// Compares structurally and by fingerprint. Returns the shared fingerprint.
pub fn verify_replay<G: Game>(
    processor: &CommandProcessor<G>,
    initial: &MatchState<G::Core>,
    commands: &[Command],
    expected: &MatchState<G::Core>,
) -> Result<u64, ReplayError> {
    let outcome = replay(processor, initial, commands)?;
    let expected_fp = expected.fingerprint()?;
    let actual_fp = outcome.state.fingerprint()?;

    if outcome.state != *expected || expected_fp != actual_fp {
        return Err(ReplayError::Diverged {
            expected: expected_fp,
            actual: actual_fp,
        });
    }
    Ok(actual_fp)
}

//! Debug and replay interface.
//!
//! ## State patches
//!
//! `patch_core` deep-merges a JSON object into the JSON form of a match's
//! `Core`. It bypasses command validation entirely, so it requires a
//! `DebugAccess` token, which only a host running with debug tools enabled
//! can hand out.
//!
//! ## Replay
//!
//! `replay` re-applies a command sequence from an initial state;
//! `verify_replay` checks the result against a live state.

pub mod merge;
pub mod replay;

pub use merge::deep_merge;
pub use replay::{replay, verify_replay, ReplayError, ReplayOutcome};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::core::config::HostConfig;
use crate::core::state::MatchState;

/// Proof that debug tools are enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugAccess {
    _private: (),
}

impl DebugAccess {
    /// Grant access if the host allows debug tools.
    #[must_use]
    pub fn grant(config: &HostConfig) -> Option<Self> {
        if config.debug_tools {
            Some(Self { _private: () })
        } else {
            warn!("debug access denied: debug tools are disabled");
            None
        }
    }
}

/// State patch failures. The state is unchanged in every case.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Patches must be JSON objects.
    #[error("patch must be a JSON object")]
    NotAnObject,

    /// The current core could not be converted to JSON.
    #[error("could not encode core: {0}")]
    Encode(#[source] serde_json::Error),

    /// The merged JSON is not a valid core.
    #[error("patched core is invalid: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Deep-merge `patch` into the state's `Core`.
pub fn patch_core<C>(
    _access: &DebugAccess,
    state: &MatchState<C>,
    patch: &Value,
) -> Result<MatchState<C>, PatchError>
where
    C: Clone + Serialize + DeserializeOwned,
{
    if !patch.is_object() {
        return Err(PatchError::NotAnObject);
    }

    let mut json = serde_json::to_value(state.core()).map_err(PatchError::Encode)?;
    deep_merge(&mut json, patch);
    let core = serde_json::from_value(json).map_err(PatchError::Decode)?;

    let mut next = state.clone();
    next.core = core;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MatchConfig, PhaseId};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Core {
        hp: Vec<i64>,
        label: String,
    }

    fn state() -> MatchState<Core> {
        let core = Core {
            hp: vec![20, 20],
            label: "x".into(),
        };
        MatchState::new(core, &MatchConfig::new(2), PhaseId::new("main"))
    }

    #[test]
    fn test_access_requires_flag() {
        assert!(DebugAccess::grant(&HostConfig::default()).is_none());
        assert!(DebugAccess::grant(&HostConfig::default().with_debug_tools(true)).is_some());
    }

    #[test]
    fn test_patch_merges_core_only() {
        let access = DebugAccess::grant(&HostConfig::default().with_debug_tools(true)).unwrap();
        let before = state();

        let after = patch_core(&access, &before, &json!({ "hp": [1, 2] })).unwrap();

        assert_eq!(after.core().hp, vec![1, 2]);
        assert_eq!(after.core().label, "x");
        assert_eq!(after.turn_number(), before.turn_number());
        assert_eq!(before.core().hp, vec![20, 20]);
    }

    #[test]
    fn test_invalid_patch_rejected() {
        let access = DebugAccess::grant(&HostConfig::default().with_debug_tools(true)).unwrap();
        let before = state();

        assert!(matches!(
            patch_core(&access, &before, &json!({ "hp": "lots" })),
            Err(PatchError::Decode(_))
        ));
        assert!(matches!(
            patch_core(&access, &before, &json!([1])),
            Err(PatchError::NotAnObject)
        ));
    }
}

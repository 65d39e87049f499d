//! Match hosting.
//!
//! ## Layers
//!
//! - `HostedMatch<G>`: one match, synchronous, fully typed
//! - `MatchRuntime`: JSON-facing trait object over any hosted match
//! - worker: one tokio task per match draining a bounded command queue
//! - `MatchRegistry`: every live match keyed by `MatchId`
//!
//! There is no process-wide match state; hosts create and own a registry.
//!
//! ```no_run
//! use tabletop_engine::core::{Command, HostConfig, MatchConfig, PlayerId};
//! use tabletop_engine::games::duel::DuelGame;
//! use tabletop_engine::host::{GameCatalog, MatchRegistry};
//!
//! # async fn demo() -> Result<(), tabletop_engine::core::EngineError> {
//! let catalog = GameCatalog::new().with(DuelGame::new);
//! let registry = MatchRegistry::new(catalog, HostConfig::from_env());
//!
//! let id = registry.create_match("duel", "room-1", MatchConfig::new(2).with_seed(7)).await?;
//! registry.submit_command(id.as_str(), Command::new("ADVANCE_PHASE", PlayerId::new(0))).await?;
//! let fresh = registry.read_since(id.as_str(), 0).await?;
//! # Ok(())
//! # }
//! ```

pub mod hosted;
pub mod registry;
pub(crate) mod worker;

pub use hosted::{HostedMatch, MatchRuntime};
pub use registry::{GameCatalog, GameFactory, MatchRegistry};

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Match identifier chosen by the host.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Create a match id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MatchId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MatchId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

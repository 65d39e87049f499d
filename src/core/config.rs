//! Match and host configuration types.
//!
//! - `PhaseId`: opaque phase identifier; games define their phase lists
//! - `MatchConfig`: per-match setup (seats, seed, host, starting player)
//! - `HostConfig`: process-level switches for the match host
//!
//! The engine never hardcodes phases - games configure them through their
//! flow definition.

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::PlayerId;

/// Opaque phase identifier. Games define their own phases.
///
/// The engine doesn't interpret phase names - they're compared for equality
/// and looked up in the game's configured phase order.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseId(String);

impl PhaseId {
    /// Create a new phase ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the phase name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhaseId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for PhaseId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PhaseId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Per-match configuration.
///
/// Hosts provide this when a match is created. The seed feeds the
/// state-carried RNG, so two matches with the same config and the same
/// command sequence end in identical states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    /// Number of seats (1-255).
    pub player_count: usize,

    /// Seed for the match RNG.
    pub seed: u64,

    /// Seat that owns the room (rematch votes, host-only commands).
    pub host_player: PlayerId,

    /// Seat that takes the first turn.
    pub starting_player: PlayerId,
}

impl MatchConfig {
    /// Create a new match configuration.
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            seed: 0,
            host_player: PlayerId::new(0),
            starting_player: PlayerId::new(0),
        }
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the host seat.
    #[must_use]
    pub fn with_host(mut self, host: PlayerId) -> Self {
        self.host_player = host;
        self
    }

    /// Set the seat that moves first.
    #[must_use]
    pub fn with_starting_player(mut self, player: PlayerId) -> Self {
        self.starting_player = player;
        self
    }

    /// Check a config that did not come through [`MatchConfig::new`].
    ///
    /// Deserialized configs skip the constructor's asserts; hosts call this
    /// before building a match from one.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=255).contains(&self.player_count) {
            return Err(EngineError::InvalidConfig(format!(
                "playerCount must be 1-255, got {}",
                self.player_count
            )));
        }
        if self.starting_player.index() >= self.player_count {
            return Err(EngineError::InvalidConfig(format!(
                "startingPlayer {} has no seat",
                self.starting_player
            )));
        }
        if self.host_player.index() >= self.player_count {
            return Err(EngineError::InvalidConfig(format!(
                "hostPlayer {} has no seat",
                self.host_player
            )));
        }
        Ok(())
    }

    /// Seats in turn order, rotated so the starting player comes first.
    ///
    /// A starting player outside the seat range falls back to seat 0.
    #[must_use]
    pub fn player_order(&self) -> Vec<PlayerId> {
        let start = if self.starting_player.index() < self.player_count {
            self.starting_player.index()
        } else {
            0
        };
        (0..self.player_count)
            .map(|offset| PlayerId::new(((start + offset) % self.player_count) as u8))
            .collect()
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Environment variable enabling the debug patch surface.
pub const DEBUG_TOOLS_ENV: &str = "TABLETOP_DEBUG_TOOLS";

/// Environment variable overriding the per-match command queue depth.
pub const QUEUE_DEPTH_ENV: &str = "TABLETOP_QUEUE_DEPTH";

/// Environment variable overriding the raw journal capacity.
pub const JOURNAL_LIMIT_ENV: &str = "TABLETOP_JOURNAL_LIMIT";

/// Match host configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// Allow direct state patches. Never enable for production matches.
    pub debug_tools: bool,

    /// Bound of each match's inbound command queue.
    pub queue_depth: usize,

    /// Entries kept in each match's raw command/event journal.
    #[serde(default = "default_journal_limit")]
    pub journal_limit: usize,
}

fn default_journal_limit() -> usize {
    1000
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            debug_tools: false,
            queue_depth: 64,
            journal_limit: default_journal_limit(),
        }
    }
}

impl HostConfig {
    /// Read overrides from the process environment.
    ///
    /// `TABLETOP_DEBUG_TOOLS` accepts `1`/`true`/`yes`/`on`.
    /// `TABLETOP_QUEUE_DEPTH` accepts a positive integer and
    /// `TABLETOP_JOURNAL_LIMIT` any integer. Anything else keeps the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(DEBUG_TOOLS_ENV) {
            config.debug_tools = parse_flag(&raw);
        }
        if let Some(depth) = std::env::var(QUEUE_DEPTH_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|depth| *depth > 0)
        {
            config.queue_depth = depth;
        }
        if let Some(limit) = std::env::var(JOURNAL_LIMIT_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
        {
            config.journal_limit = limit;
        }
        config
    }

    /// Enable or disable the debug patch surface.
    #[must_use]
    pub fn with_debug_tools(mut self, enabled: bool) -> Self {
        self.debug_tools = enabled;
        self
    }

    /// Set the per-match queue depth (minimum 1).
    #[must_use]
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Set the raw journal capacity. 0 disables the journal.
    #[must_use]
    pub fn with_journal_limit(mut self, limit: usize) -> Self {
        self.journal_limit = limit;
        self
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phase_id() {
        let phase = PhaseId::new("main1");
        assert_eq!(phase.as_str(), "main1");
        assert_eq!(phase.to_string(), "main1");
        assert_eq!(phase, "main1");
        assert_eq!(PhaseId::from("combat"), PhaseId::new("combat"));
    }

    #[test]
    fn test_phase_id_serializes_as_string() {
        let json = serde_json::to_string(&PhaseId::new("draw")).unwrap();
        assert_eq!(json, "\"draw\"");
    }

    #[test]
    fn test_match_config_builder() {
        let config = MatchConfig::new(3)
            .with_seed(99)
            .with_host(PlayerId::new(2))
            .with_starting_player(PlayerId::new(1));

        assert_eq!(config.seed, 99);
        assert_eq!(config.host_player, PlayerId::new(2));
        assert_eq!(
            config.player_order(),
            vec![PlayerId::new(1), PlayerId::new(2), PlayerId::new(0)]
        );
    }

    #[test]
    fn test_player_order_out_of_range_start() {
        let config = MatchConfig::new(2).with_starting_player(PlayerId::new(7));
        assert_eq!(config.player_order(), vec![PlayerId::new(0), PlayerId::new(1)]);
    }

    #[test]
    fn test_validate() {
        assert!(MatchConfig::new(2).validate().is_ok());
        assert!(MatchConfig::new(255).validate().is_ok());

        let bad = [
            json!({ "playerCount": 0, "seed": 0, "hostPlayer": 0, "startingPlayer": 0 }),
            json!({ "playerCount": 300, "seed": 0, "hostPlayer": 0, "startingPlayer": 0 }),
            json!({ "playerCount": 2, "seed": 0, "hostPlayer": 0, "startingPlayer": 2 }),
            json!({ "playerCount": 2, "seed": 0, "hostPlayer": 5, "startingPlayer": 0 }),
        ];
        for raw in bad {
            let config: MatchConfig = serde_json::from_value(raw).unwrap();
            assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
        }
        assert!(MatchConfig::new(2)
            .with_starting_player(PlayerId::new(7))
            .validate()
            .is_err());
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_match_config_zero_players() {
        MatchConfig::new(0);
    }

    #[test]
    fn test_host_config_defaults() {
        let config = HostConfig::default();
        assert!(!config.debug_tools);
        assert_eq!(config.queue_depth, 64);
        assert_eq!(config.journal_limit, 1000);

        let config = config
            .with_debug_tools(true)
            .with_queue_depth(0)
            .with_journal_limit(10);
        assert!(config.debug_tools);
        assert_eq!(config.queue_depth, 1);
        assert_eq!(config.journal_limit, 10);
    }

    #[test]
    fn test_host_config_journal_limit_defaults_when_absent() {
        let config: HostConfig =
            serde_json::from_str(r#"{ "debugTools": true, "queueDepth": 8 }"#).unwrap();
        assert_eq!(config.journal_limit, 1000);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }
}

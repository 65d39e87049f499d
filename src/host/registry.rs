//! Match registry: every live match, keyed by id.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{oneshot, watch, RwLock};
use tracing::{info, warn};

use super::hosted::{HostedMatch, MatchRuntime};
use super::worker::{self, MatchHandle, MatchRequest};
use super::MatchId;
use crate::actionlog::ActionLogEntry;
use crate::core::command::Command;
use crate::core::config::{HostConfig, MatchConfig};
use crate::core::error::EngineError;
use crate::rules::Game;
use crate::stream::{EventStream, EventStreamEntry, JournalEntry};

/// Builds a hosted match for one game.
pub type GameFactory =
    Arc<dyn Fn(MatchId, &MatchConfig, &HostConfig) -> Box<dyn MatchRuntime> + Send + Sync>;

/// Game id -> factory.
#[derive(Clone, Default)]
pub struct GameCatalog {
    factories: BTreeMap<String, GameFactory>,
}

impl GameCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a game (builder pattern).
    #[must_use]
    pub fn with<G, F>(mut self, make: F) -> Self
    where
        G: Game,
        F: Fn() -> G + Send + Sync + 'static,
    {
        self.register(make);
        self
    }

    /// Register a game. `make` is called once per created match.
    ///
    /// Panics if a game with the same id is already registered.
    pub fn register<G, F>(&mut self, make: F)
    where
        G: Game,
        F: Fn() -> G + Send + Sync + 'static,
    {
        let game_id = make().id().to_string();
        assert!(
            !self.factories.contains_key(&game_id),
            "Duplicate game id {game_id}"
        );
        let factory: GameFactory = Arc::new(
            move |id: MatchId, config: &MatchConfig, host: &HostConfig| -> Box<dyn MatchRuntime> {
                Box::new(HostedMatch::new(id, make(), config, host))
            },
        );
        self.factories.insert(game_id, factory);
    }

    /// Registered game ids, sorted.
    #[must_use]
    pub fn game_ids(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build a hosted match. The config is validated first.
    pub fn create(
        &self,
        game_id: &str,
        id: MatchId,
        config: &MatchConfig,
        host: &HostConfig,
    ) -> Result<Box<dyn MatchRuntime>, EngineError> {
        let factory = self
            .factories
            .get(game_id)
            .ok_or_else(|| EngineError::UnknownGame(game_id.to_string()))?;
        config.validate()?;
        Ok(factory(id, config, host))
    }
}

impl std::fmt::Debug for GameCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameCatalog")
            .field("games", &self.game_ids())
            .finish()
    }
}

/// All live matches of one host process.
///
/// Each match is served by its own worker task; the registry only routes
/// requests and hands out snapshots.
pub struct MatchRegistry {
    catalog: GameCatalog,
    config: HostConfig,
    matches: RwLock<BTreeMap<MatchId, MatchHandle>>,
}

impl MatchRegistry {
    /// Create a registry.
    #[must_use]
    pub fn new(catalog: GameCatalog, config: HostConfig) -> Self {
        Self {
            catalog,
            config,
            matches: RwLock::new(BTreeMap::new()),
        }
    }

    /// Host configuration.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Start a match of `game_id` under `match_id`.
    pub async fn create_match(
        &self,
        game_id: &str,
        match_id: impl Into<MatchId>,
        config: MatchConfig,
    ) -> Result<MatchId, EngineError> {
        let match_id = match_id.into();
        let mut matches = self.matches.write().await;
        if matches.contains_key(&match_id) {
            return Err(EngineError::MatchExists(match_id.to_string()));
        }

        let runtime = self
            .catalog
            .create(game_id, match_id.clone(), &config, &self.config)?;
        let handle = worker::spawn(runtime, self.config.queue_depth);
        matches.insert(match_id.clone(), handle);
        info!(%match_id, game = game_id, "match registered");
        Ok(match_id)
    }

    /// Ids of live matches, sorted.
    pub async fn match_ids(&self) -> Vec<MatchId> {
        self.matches.read().await.keys().cloned().collect()
    }

    /// Game id of a live match.
    pub async fn game_of(&self, match_id: &str) -> Result<&'static str, EngineError> {
        let matches = self.matches.read().await;
        matches
            .get(match_id)
            .map(|h| h.game_id)
            .ok_or_else(|| EngineError::MatchNotFound(match_id.to_string()))
    }

    /// Queue a command and wait for its outcome.
    pub async fn submit_command(
        &self,
        match_id: &str,
        command: Command,
    ) -> Result<Vec<EventStreamEntry>, EngineError> {
        let entries = self
            .request(match_id, |reply| MatchRequest::Submit { command, reply })
            .await??;
        Ok(entries)
    }

    /// Stream entries after `cursor`, read from the latest snapshot.
    pub async fn read_since(
        &self,
        match_id: &str,
        cursor: u64,
    ) -> Result<Vec<EventStreamEntry>, EngineError> {
        let snapshot = self.stream_snapshot(match_id).await?;
        Ok(snapshot.read_since(cursor))
    }

    /// Latest stream snapshot.
    pub async fn stream_snapshot(&self, match_id: &str) -> Result<EventStream, EngineError> {
        let matches = self.matches.read().await;
        let handle = Self::lookup(&matches, match_id)?;
        let snapshot = handle.stream.borrow().clone();
        Ok(snapshot)
    }

    /// Latest state snapshot as JSON.
    pub async fn get_state(&self, match_id: &str) -> Result<Value, EngineError> {
        let matches = self.matches.read().await;
        let handle = Self::lookup(&matches, match_id)?;
        let state = handle.state.borrow().clone();
        Ok(state)
    }

    /// Action-log entries, oldest first.
    pub async fn action_log(&self, match_id: &str) -> Result<Vec<ActionLogEntry>, EngineError> {
        self.request(match_id, |reply| MatchRequest::ActionLog { reply })
            .await
    }

    /// Raw journal of recent commands and events, oldest first.
    pub async fn journal(&self, match_id: &str) -> Result<Vec<JournalEntry>, EngineError> {
        self.request(match_id, |reply| MatchRequest::Journal { reply })
            .await
    }

    /// Deep-merge a patch into a match's `Core`. Requires debug tools.
    pub async fn patch_state(&self, match_id: &str, patch: Value) -> Result<Value, EngineError> {
        if !self.config.debug_tools {
            warn!(match_id, "state patch refused: debug tools are disabled");
            return Err(EngineError::DebugDisabled);
        }
        self.request(match_id, |reply| MatchRequest::Patch { patch, reply })
            .await?
    }

    /// Persist a reader's position. Returns the stored position.
    pub async fn commit_cursor(
        &self,
        match_id: &str,
        reader: &str,
        position: u64,
    ) -> Result<u64, EngineError> {
        let reader = reader.to_string();
        self.request(match_id, |reply| MatchRequest::CommitCursor {
            reader,
            position,
            reply,
        })
        .await
    }

    /// Stored position of a reader (0 if unknown).
    pub async fn cursor(&self, match_id: &str, reader: &str) -> Result<u64, EngineError> {
        let reader = reader.to_string();
        self.request(match_id, |reply| MatchRequest::Cursor { reader, reply })
            .await
    }

    /// Watch stream snapshots as they are published.
    pub async fn subscribe(
        &self,
        match_id: &str,
    ) -> Result<watch::Receiver<EventStream>, EngineError> {
        let matches = self.matches.read().await;
        let handle = Self::lookup(&matches, match_id)?;
        Ok(handle.stream.clone())
    }

    /// Replay a match's accepted commands and compare with its live state.
    pub async fn verify_replay(&self, match_id: &str) -> Result<u64, EngineError> {
        let fingerprint = self
            .request(match_id, |reply| MatchRequest::Verify { reply })
            .await??;
        Ok(fingerprint)
    }

    /// Stop a match and drop its state.
    pub async fn close_match(&self, match_id: &str) -> Result<(), EngineError> {
        let handle = self
            .matches
            .write()
            .await
            .remove(match_id)
            .ok_or_else(|| EngineError::MatchNotFound(match_id.to_string()))?;

        drop(handle.sender);
        if let Err(e) = handle.task.await {
            warn!(match_id, error = %e, "match worker ended abnormally");
        }
        info!(match_id, "match closed");
        Ok(())
    }

    fn lookup<'m>(
        matches: &'m BTreeMap<MatchId, MatchHandle>,
        match_id: &str,
    ) -> Result<&'m MatchHandle, EngineError> {
        matches
            .get(match_id)
            .ok_or_else(|| EngineError::MatchNotFound(match_id.to_string()))
    }

    async fn request<T>(
        &self,
        match_id: &str,
        build: impl FnOnce(oneshot::Sender<T>) -> MatchRequest,
    ) -> Result<T, EngineError> {
        let sender = {
            let matches = self.matches.read().await;
            let handle = Self::lookup(&matches, match_id)?;
            handle.sender.clone()
        };

        let (reply, response) = oneshot::channel();
        sender
            .send(build(reply))
            .await
            .map_err(|_| EngineError::WorkerClosed(match_id.to_string()))?;
        response
            .await
            .map_err(|_| EngineError::WorkerClosed(match_id.to_string()))
    }
}

impl std::fmt::Debug for MatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchRegistry")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

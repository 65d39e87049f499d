//! Tabletop engine demo.
//!
//! Hosts one duel in a `MatchRegistry`, drives both seats with a scripted
//! player, prints the rendered action log and verifies the match replays
//! to the same state.
//!
//! Usage: `tabletop-demo [locale] [seed]` (`en` or `de`).

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tabletop_engine::actionlog::{build_rows, RowOptions};
use tabletop_engine::games::duel::{self, DuelGame};
use tabletop_engine::{Command, EngineError, GameCatalog, HostConfig, MatchConfig, MatchRegistry, PlayerId};

const MAX_TURNS: u32 = 60;
const CARD_PREFERENCE: [&str; 4] = ["fireball", "strike", "barrier", "mend"];

/// Deterministic command clock in milliseconds.
struct Clock(u64);

impl Clock {
    fn tick(&mut self) -> u64 {
        self.0 += 1500;
        self.0
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let locale = args.next().unwrap_or_else(|| "en".to_string());
    let seed: u64 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid seed {raw:?}"))?,
        None => 7,
    };

    let registry = MatchRegistry::new(GameCatalog::new().with(DuelGame::new), HostConfig::from_env());
    let match_id = registry
        .create_match("duel", "demo", MatchConfig::new(2).with_seed(seed))
        .await?;
    info!(%match_id, seed, "duel started");

    let mut clock = Clock(0);
    for _ in 0..MAX_TURNS {
        let state = registry.get_state(match_id.as_str()).await?;
        if !state["gameOver"].is_null() {
            break;
        }
        let player: PlayerId = serde_json::from_value(state["currentPlayer"].clone())
            .context("state has no current player")?;
        play_turn(&registry, match_id.as_str(), player, &mut clock).await?;
    }

    let state = registry.get_state(match_id.as_str()).await?;
    info!(result = %state["gameOver"], turns = %state["turnNumber"], "duel finished");

    let catalog = duel::message_catalog(&locale);
    let options = RowOptions {
        newest_first: false,
        ..RowOptions::default()
    };
    for row in build_rows(&registry.action_log(match_id.as_str()).await?, &catalog, &options) {
        println!("{} {:>3}  {}", row.time_label, row.player_label, row.text);
    }

    let entries = registry.read_since(match_id.as_str(), 0).await?;
    let fingerprint = registry.verify_replay(match_id.as_str()).await?;
    info!(events = entries.len(), fingerprint = %format!("{fingerprint:#018x}"), "replay verified");

    registry.close_match(match_id.as_str()).await?;
    Ok(())
}

/// One scripted turn: play what is affordable, attack, pass.
async fn play_turn(
    registry: &MatchRegistry,
    match_id: &str,
    player: PlayerId,
    clock: &mut Clock,
) -> Result<()> {
    let mut command = |command_type: &str, payload: Value| {
        Command::new(command_type, player)
            .with_payload(payload)
            .at(clock.tick())
    };

    submit(registry, match_id, command("ADVANCE_PHASE", Value::Null)).await?;
    for card in CARD_PREFERENCE {
        submit(registry, match_id, command("PLAY_CARD", json!({ "cardId": card }))).await?;
    }
    submit(registry, match_id, command("ADVANCE_PHASE", Value::Null)).await?;
    submit(registry, match_id, command(duel::ROLL_ATTACK, Value::Null)).await?;
    submit(registry, match_id, command(duel::RESOLVE_ATTACK, Value::Null)).await?;
    submit(registry, match_id, command("END_TURN", Value::Null)).await?;
    Ok(())
}

/// Submit a command; rule rejections are expected and only logged.
async fn submit(registry: &MatchRegistry, match_id: &str, command: Command) -> Result<()> {
    let command_type = command.command_type.clone();
    match registry.submit_command(match_id, command).await {
        Ok(entries) => {
            debug!(command = %command_type, events = entries.len(), "accepted");
            Ok(())
        }
        Err(EngineError::Rejected(reason)) => {
            debug!(command = %command_type, %reason, "rejected");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

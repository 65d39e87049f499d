//! Simple game implementation.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::actionlog::{ActionLogEntry, ActionLogFormatter, ActionLogSegment, FormatContext};
use crate::core::{GameEvent, GameRng, MatchConfig, MatchState, PhaseId, PlayerId, PlayerMap, RejectionReason};
use crate::flow::{FlowConfig, FlowGuard};
use crate::rules::{CommandContext, CommandHandler, Game, GameResult, HandlerTable};

/// Phases of a simple turn.
pub const PHASES: [&str; 3] = ["main1", "main2", "end"];

/// Core state of the simple game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleCore {
    /// Points per seat.
    pub scores: PlayerMap<i64>,
    /// Spendable tokens per seat.
    pub tokens: PlayerMap<i64>,
    /// Cheers received per seat.
    pub cheers: PlayerMap<u32>,
    /// Whether the gate guard blocks leaving `main1`.
    pub locked: bool,
}

/// Simple game rules.
#[derive(Clone, Debug)]
pub struct SimpleGame {
    starting_tokens: i64,
    target_score: Option<i64>,
    gate: bool,
    start_locked: bool,
    skipped: Vec<PhaseId>,
}

/// Builder for creating a SimpleGame.
#[derive(Clone, Debug)]
pub struct SimpleGameBuilder {
    starting_tokens: i64,
    target_score: Option<i64>,
    gate: bool,
    start_locked: bool,
    skipped: Vec<PhaseId>,
}

impl Default for SimpleGameBuilder {
    fn default() -> Self {
        Self {
            starting_tokens: 3,
            target_score: None,
            gate: false,
            start_locked: false,
            skipped: Vec::new(),
        }
    }
}

impl SimpleGameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_tokens(mut self, tokens: i64) -> Self {
        self.starting_tokens = tokens;
        self
    }

    /// End the match when a seat reaches `score`.
    pub fn target_score(mut self, score: i64) -> Self {
        self.target_score = Some(score);
        self
    }

    /// Register the `gateOpen` guard on leaving `main1`, starting locked.
    pub fn with_gate(mut self) -> Self {
        self.gate = true;
        self.start_locked = true;
        self
    }

    /// Leave `phases` automatically as soon as they are entered.
    pub fn auto_skip(mut self, phases: &[&str]) -> Self {
        self.skipped.extend(phases.iter().map(|p| PhaseId::new(*p)));
        self
    }

    pub fn build(self) -> SimpleGame {
        SimpleGame {
            starting_tokens: self.starting_tokens,
            target_score: self.target_score,
            gate: self.gate,
            start_locked: self.start_locked,
            skipped: self.skipped,
        }
    }
}

impl Default for SimpleGame {
    fn default() -> Self {
        SimpleGameBuilder::new().build()
    }
}

impl SimpleGame {
    /// Game with default settings.
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Deserialize)]
struct AmountPayload {
    #[serde(default = "one")]
    amount: i64,
}

fn one() -> i64 {
    1
}

fn amount(ctx: &CommandContext<'_, SimpleCore>) -> Result<i64, RejectionReason> {
    if ctx.command().payload.is_null() {
        return Ok(1);
    }
    let payload: AmountPayload = ctx.payload()?;
    if payload.amount <= 0 {
        return Err(RejectionReason::InvalidPayload("amount must be positive".into()));
    }
    Ok(payload.amount)
}

fn score(ctx: &mut CommandContext<'_, SimpleCore>) -> Result<(), RejectionReason> {
    let amount = amount(ctx)?;
    let player = ctx.actor();
    ctx.emit("SCORED", json!({ "playerId": player, "amount": amount }));
    Ok(())
}

fn buy(ctx: &mut CommandContext<'_, SimpleCore>) -> Result<(), RejectionReason> {
    let cost = amount(ctx)?;
    let player = ctx.actor();
    if ctx.core().tokens.try_get(player).copied().unwrap_or(0) < cost {
        return Err(RejectionReason::InsufficientResource);
    }
    ctx.emit("TOKENS_SPENT", json!({ "playerId": player, "delta": -cost }));
    ctx.emit("SCORED", json!({ "playerId": player, "amount": cost * 2 }));
    Ok(())
}

fn roll(ctx: &mut CommandContext<'_, SimpleCore>) -> Result<(), RejectionReason> {
    let value = ctx.rng().roll_die(6);
    let player = ctx.actor();
    ctx.emit("ROLLED", json!({ "playerId": player, "value": value }));
    ctx.emit("SCORED", json!({ "playerId": player, "amount": value }));
    Ok(())
}

fn cheer(ctx: &mut CommandContext<'_, SimpleCore>) -> Result<(), RejectionReason> {
    let target = ctx
        .command()
        .player_field("targetPlayerId")?
        .unwrap_or_else(|| ctx.state().current_player());
    if !ctx.state().is_seated(target) {
        return Err(RejectionReason::IllegalTarget);
    }
    let player = ctx.actor();
    ctx.emit("CHEERED", json!({ "playerId": player, "targetPlayerId": target }));
    Ok(())
}

fn set_gate(locked: bool) -> impl Fn(&mut CommandContext<'_, SimpleCore>) -> Result<(), RejectionReason> {
    move |ctx: &mut CommandContext<'_, SimpleCore>| {
        ctx.emit("GATE_CHANGED", json!({ "locked": locked }));
        Ok(())
    }
}

impl Game for SimpleGame {
    type Core = SimpleCore;

    fn id(&self) -> &'static str {
        "simple"
    }

    fn setup(&self, config: &MatchConfig, _rng: &mut GameRng) -> SimpleCore {
        SimpleCore {
            scores: PlayerMap::with_value(config.player_count, 0),
            tokens: PlayerMap::with_value(config.player_count, self.starting_tokens),
            cheers: PlayerMap::with_value(config.player_count, 0),
            locked: self.start_locked,
        }
    }

    fn flow(&self) -> FlowConfig<SimpleCore> {
        let flow = FlowConfig::new(&PHASES);
        if self.gate {
            flow.with_guard(FlowGuard::new("gateOpen", |core: &SimpleCore| !core.locked).leaving("main1"))
        } else {
            flow
        }
    }

    fn handlers(&self) -> HandlerTable<SimpleCore> {
        HandlerTable::new()
            .with(CommandHandler::new("SCORE", score).during(&["main1", "main2"]))
            .with(CommandHandler::new("BUY", buy).during(&["main1", "main2"]))
            .with(CommandHandler::new("ROLL", roll).during(&["main1"]))
            .with(CommandHandler::new("CHEER", cheer).any_player())
            .with(CommandHandler::new("LOCK", set_gate(true)).host_only())
            .with(CommandHandler::new("UNLOCK", set_gate(false)).host_only())
    }

    fn reduce(&self, core: &mut SimpleCore, event: &GameEvent) {
        match event.event_type.as_str() {
            "SCORED" => {
                if let Some(player) = event.player_field("playerId") {
                    if let Some(score) = core.scores.try_get_mut(player) {
                        *score += event.int_field("amount", 0);
                    }
                }
            }
            "TOKENS_SPENT" => {
                if let Some(player) = event.player_field("playerId") {
                    if let Some(tokens) = core.tokens.try_get_mut(player) {
                        *tokens += event.int_field("delta", 0);
                    }
                }
            }
            "CHEERED" => {
                if let Some(target) = event.player_field("targetPlayerId") {
                    if let Some(cheers) = core.cheers.try_get_mut(target) {
                        *cheers += 1;
                    }
                }
            }
            "GATE_CHANGED" => {
                core.locked = event
                    .field("locked")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(core.locked);
            }
            _ => {}
        }
    }

    fn auto_continue(&self, state: &MatchState<SimpleCore>) -> bool {
        self.skipped.contains(state.phase())
    }

    fn is_game_over(&self, state: &MatchState<SimpleCore>) -> Option<GameResult> {
        let target = self.target_score?;
        let winners: Vec<PlayerId> = state
            .core()
            .scores
            .iter()
            .filter(|(_, score)| **score >= target)
            .map(|(player, _)| player)
            .collect();

        match winners.len() {
            0 => None,
            1 => Some(GameResult::Winner(winners[0])),
            _ => Some(GameResult::Winners(winners)),
        }
    }

    fn action_log(&self) -> Option<&dyn ActionLogFormatter<SimpleCore>> {
        Some(&SIMPLE_LOG)
    }
}

type SimpleFormatter = fn(&FormatContext<'_, SimpleCore>) -> Vec<ActionLogEntry>;

static SIMPLE_LOG: SimpleFormatter = format_simple;

fn format_simple(ctx: &FormatContext<'_, SimpleCore>) -> Vec<ActionLogEntry> {
    ctx.events_of("SCORED")
        .enumerate()
        .map(|(i, event)| {
            let text = format!(
                "P{} scored {}",
                ctx.command.player_id,
                event.int_field("amount", 0)
            );
            ctx.entry(i, "scored", vec![ActionLogSegment::text(text)])
        })
        .collect()
}

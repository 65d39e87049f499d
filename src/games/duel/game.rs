//! Duel rules.

use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::cards::{self, CardEffect, STARTING_DECK};
use super::log::DuelLog;
use crate::actionlog::ActionLogFormatter;
use crate::core::{
    DiceRoll, GameEvent, GameRng, MatchConfig, MatchState, PhaseId, PlayerId, PlayerMap,
    RejectionReason,
};
use crate::flow::{FlowConfig, FlowGuard, TURN_ENDED};
use crate::rules::{CommandContext, CommandHandler, Game, GameResult, HandlerTable};

/// Phases of a duel turn.
pub const PHASES: [&str; 5] = ["draw", "main1", "combat", "main2", "end"];

pub const PLAY_CARD: &str = "PLAY_CARD";
pub const ROLL_ATTACK: &str = "ROLL_ATTACK";
pub const RESOLVE_ATTACK: &str = "RESOLVE_ATTACK";

pub const STARTING_HEALTH: i64 = 20;
pub const STARTING_ENERGY: i64 = 3;
pub const ENERGY_PER_TURN: i64 = 2;
pub const MAX_ENERGY: i64 = 10;
pub const OPENING_HAND: usize = 3;
pub const MAX_HAND: usize = 7;
pub const ATTACK_DICE: usize = 3;

/// Shield id reported in `shieldsConsumed`.
pub const BARRIER_SHIELD: &str = "barrier";

/// One player's side of the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fighter {
    pub health: i64,
    pub energy: i64,
    pub shield: i64,
    pub hand: Vector<String>,
    pub deck: Vector<String>,
    pub discard: Vector<String>,
    /// Set once the player has rolled an attack this turn.
    pub attacked: bool,
}

impl Fighter {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Flat bonus on an attack roll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackModifier {
    #[serde(rename = "type")]
    pub modifier_type: String,
    pub value: i64,
    pub source_id: String,
    pub source_name: String,
}

/// Attack rolled in combat and waiting to be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAttack {
    #[serde(rename = "playerId")]
    pub attacker: PlayerId,
    #[serde(rename = "targetPlayerId")]
    pub target: PlayerId,
    pub dice: DiceRoll,
    pub base: i64,
    #[serde(default)]
    pub modifiers: Vec<AttackModifier>,
}

impl PendingAttack {
    /// Base plus modifiers.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.base + self.modifiers.iter().map(|m| m.value).sum::<i64>()
    }
}

/// Duel `Core`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelCore {
    pub fighters: PlayerMap<Fighter>,
    #[serde(default)]
    pub pending_attack: Option<PendingAttack>,
}

impl DuelCore {
    /// Seats still in the match.
    pub fn living(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.fighters
            .iter()
            .filter(|(_, f)| f.is_alive())
            .map(|(player, _)| player)
    }
}

/// Demo card-and-dice duel.
#[derive(Debug, Default)]
pub struct DuelGame {
    log: DuelLog,
}

impl DuelGame {
    /// Create the ruleset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Bonus for matching dice: all equal beats a pair.
pub fn attack_modifiers(dice: &[u8]) -> Vec<AttackModifier> {
    let mut counts = [0u8; 7];
    for &die in dice {
        if let Some(count) = counts.get_mut(usize::from(die)) {
            *count += 1;
        }
    }
    let best = counts.iter().copied().max().unwrap_or(0);

    let (modifier_type, value) = match best {
        n if n >= 3 => ("triple", 4),
        2 => ("pair", 2),
        _ => return Vec::new(),
    };
    vec![AttackModifier {
        modifier_type: modifier_type.to_string(),
        value,
        source_id: modifier_type.to_string(),
        source_name: format!("modifier.{modifier_type}"),
    }]
}

fn fighter<'c>(
    ctx: &'c CommandContext<'_, DuelCore>,
    player: PlayerId,
) -> Result<&'c Fighter, RejectionReason> {
    ctx.core()
        .fighters
        .try_get(player)
        .ok_or(RejectionReason::InvalidActor)
}

fn living_actor<'c>(ctx: &'c CommandContext<'_, DuelCore>) -> Result<&'c Fighter, RejectionReason> {
    let fighter = fighter(ctx, ctx.actor())?;
    if fighter.is_alive() {
        Ok(fighter)
    } else {
        Err(RejectionReason::InvalidActor)
    }
}

/// First seat after `player` in turn order whose fighter is alive.
///
/// Wraps around, so `player` itself is returned when nobody else lives.
fn next_living(state: &MatchState<DuelCore>, player: PlayerId) -> Option<PlayerId> {
    let mut next = state.next_player_after(player);
    for _ in 0..state.player_count() {
        if state.core().fighters.try_get(next).is_some_and(Fighter::is_alive) {
            return Some(next);
        }
        next = state.next_player_after(next);
    }
    None
}

/// Requested opponent, or the next living seat after the actor.
fn opponent(
    ctx: &CommandContext<'_, DuelCore>,
    requested: Option<PlayerId>,
) -> Result<PlayerId, RejectionReason> {
    let actor = ctx.actor();
    let state = ctx.state();
    let target = requested
        .or_else(|| next_living(state, actor))
        .unwrap_or(actor);

    let alive = ctx
        .core()
        .fighters
        .try_get(target)
        .is_some_and(Fighter::is_alive);
    if target == actor || !state.is_seated(target) || !alive {
        return Err(RejectionReason::IllegalTarget);
    }
    Ok(target)
}

struct Hit<'s> {
    target: PlayerId,
    amount: i64,
    ability: &'s str,
    entity: Option<&'s str>,
    modifiers: &'s [AttackModifier],
}

/// Emit `DAMAGE_DEALT`, letting the target's shield absorb first.
fn deal_damage(ctx: &mut CommandContext<'_, DuelCore>, hit: Hit<'_>) -> Result<(), RejectionReason> {
    let shield = ctx
        .core()
        .fighters
        .try_get(hit.target)
        .ok_or(RejectionReason::IllegalTarget)?
        .shield;
    let absorbed = shield.min(hit.amount).max(0);
    let shields = if absorbed > 0 {
        json!([{
            "id": BARRIER_SHIELD,
            "absorbed": absorbed,
            "name": cards::name_key(BARRIER_SHIELD),
        }])
    } else {
        json!([])
    };

    let attacker = ctx.actor();
    ctx.emit(
        "DAMAGE_DEALT",
        json!({
            "targetId": hit.target,
            "attackerId": attacker,
            "amount": hit.amount,
            "damage": hit.amount,
            "actualDamage": hit.amount - absorbed,
            "sourceAbilityId": hit.ability,
            "sourceEntityId": hit.entity,
            "modifiers": hit.modifiers,
            "shieldsConsumed": shields,
        }),
    );
    Ok(())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayCardPayload {
    card_id: String,
    #[serde(default)]
    target_player_id: Option<PlayerId>,
}

fn play_card(ctx: &mut CommandContext<'_, DuelCore>) -> Result<(), RejectionReason> {
    let PlayCardPayload {
        card_id,
        target_player_id,
    } = ctx.payload()?;
    let def = cards::card(&card_id).ok_or(RejectionReason::IllegalTarget)?;

    let actor_fighter = living_actor(ctx)?;
    if !actor_fighter.hand.contains(&card_id) {
        return Err(RejectionReason::IllegalTarget);
    }
    if actor_fighter.energy < def.cost {
        return Err(RejectionReason::InsufficientResource);
    }
    let target = if def.effect.is_targeted() {
        Some(opponent(ctx, target_player_id)?)
    } else {
        None
    };

    let player = ctx.actor();
    ctx.emit(
        "ENERGY_SPENT",
        json!({ "playerId": player, "delta": -def.cost, "cost": def.cost }),
    );
    ctx.emit(
        "CARD_PLAYED",
        json!({ "playerId": player, "cardId": def.id, "targetPlayerId": target }),
    );

    match (def.effect, target) {
        (CardEffect::Damage(amount), Some(target)) => deal_damage(
            ctx,
            Hit {
                target,
                amount,
                ability: def.id,
                entity: Some(def.id),
                modifiers: &[],
            },
        )?,
        (CardEffect::Shield(amount), _) => ctx.emit(
            "SHIELD_GAINED",
            json!({ "playerId": player, "amount": amount, "sourceAbilityId": def.id }),
        ),
        (CardEffect::Heal(amount), _) => {
            let missing = STARTING_HEALTH - fighter(ctx, player)?.health;
            ctx.emit(
                "HEAL_APPLIED",
                json!({
                    "targetId": player,
                    "amount": amount.min(missing).max(0),
                    "sourceAbilityId": def.id,
                }),
            );
        }
        (CardEffect::Damage(_), None) => return Err(RejectionReason::IllegalTarget),
    }
    Ok(())
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RollAttackPayload {
    #[serde(default)]
    target_player_id: Option<PlayerId>,
}

fn roll_attack(ctx: &mut CommandContext<'_, DuelCore>) -> Result<(), RejectionReason> {
    let payload: RollAttackPayload = if ctx.command().payload.is_null() {
        RollAttackPayload::default()
    } else {
        ctx.payload()?
    };
    if living_actor(ctx)?.attacked {
        return Err(RejectionReason::InsufficientResource);
    }
    let target = opponent(ctx, payload.target_player_id)?;

    let dice = ctx.rng().roll_dice(ATTACK_DICE, 6);
    let attack = PendingAttack {
        attacker: ctx.actor(),
        target,
        base: dice.iter().copied().max().map_or(0, i64::from),
        modifiers: attack_modifiers(&dice),
        dice,
    };

    ctx.emit(
        "DICE_ROLLED",
        json!({ "playerId": attack.attacker, "dice": attack.dice.as_slice(), "purpose": "attack" }),
    );
    ctx.emit("ATTACK_PREPARED", json!(attack));
    Ok(())
}

fn resolve_attack(ctx: &mut CommandContext<'_, DuelCore>) -> Result<(), RejectionReason> {
    let attack = ctx
        .core()
        .pending_attack
        .clone()
        .filter(|a| a.attacker == ctx.actor())
        .ok_or(RejectionReason::IllegalTarget)?;

    deal_damage(
        ctx,
        Hit {
            target: attack.target,
            amount: attack.total(),
            ability: "attack",
            entity: None,
            modifiers: &attack.modifiers,
        },
    )?;
    ctx.emit(
        "ATTACK_RESOLVED",
        json!({ "playerId": attack.attacker, "targetPlayerId": attack.target }),
    );
    Ok(())
}

fn seat(core: &mut DuelCore, player: Option<PlayerId>) -> Option<&mut Fighter> {
    core.fighters.try_get_mut(player?)
}

fn shift_card(from: &mut Vector<String>, to: &mut Vector<String>, card_id: &str) {
    if let Some(index) = from.index_of(&card_id.to_string()) {
        from.remove(index);
    }
    to.push_back(card_id.to_string());
}

impl Game for DuelGame {
    type Core = DuelCore;

    fn id(&self) -> &'static str {
        "duel"
    }

    fn setup(&self, config: &MatchConfig, rng: &mut GameRng) -> DuelCore {
        let mut fighters = PlayerMap::new(config.player_count, |_| Fighter {
            health: STARTING_HEALTH,
            energy: STARTING_ENERGY,
            shield: 0,
            hand: Vector::new(),
            deck: Vector::new(),
            discard: Vector::new(),
            attacked: false,
        });
        for (_, fighter) in fighters.iter_mut() {
            let mut deck: Vec<String> = STARTING_DECK.iter().map(|c| c.to_string()).collect();
            rng.shuffle(&mut deck);
            fighter.hand = deck.drain(..OPENING_HAND).collect();
            fighter.deck = deck.into_iter().collect();
        }

        DuelCore {
            fighters,
            pending_attack: None,
        }
    }

    fn flow(&self) -> FlowConfig<DuelCore> {
        FlowConfig::new(&PHASES).with_guard(
            FlowGuard::new("attackResolved", |core: &DuelCore| core.pending_attack.is_none())
                .leaving("combat"),
        )
    }

    fn handlers(&self) -> HandlerTable<DuelCore> {
        HandlerTable::new()
            .with(CommandHandler::new(PLAY_CARD, play_card).during(&["main1", "main2"]))
            .with(CommandHandler::new(ROLL_ATTACK, roll_attack).during(&["combat"]))
            .with(CommandHandler::new(RESOLVE_ATTACK, resolve_attack).during(&["combat"]))
    }

    fn reduce(&self, core: &mut DuelCore, event: &GameEvent) {
        let player = event.player_field("playerId");
        let target = event.player_field("targetId");

        match event.event_type.as_str() {
            "ENERGY_SPENT" | "ENERGY_GAINED" => {
                if let Some(f) = seat(core, player) {
                    f.energy = (f.energy + event.int_field("delta", 0)).clamp(0, MAX_ENERGY);
                }
            }
            "CARD_DRAWN" => {
                if let (Some(f), Some(card_id)) = (
                    seat(core, player),
                    event.str_field("cardId"),
                ) {
                    shift_card(&mut f.deck, &mut f.hand, card_id);
                }
            }
            "CARD_PLAYED" => {
                if let (Some(f), Some(card_id)) = (
                    seat(core, player),
                    event.str_field("cardId"),
                ) {
                    shift_card(&mut f.hand, &mut f.discard, card_id);
                }
            }
            "SHIELD_GAINED" => {
                if let Some(f) = seat(core, player) {
                    f.shield += event.int_field("amount", 0);
                }
            }
            "HEAL_APPLIED" => {
                if let Some(f) = seat(core, target) {
                    f.health = (f.health + event.int_field("amount", 0)).min(STARTING_HEALTH);
                }
            }
            "DAMAGE_DEALT" => {
                if let Some(f) = seat(core, target) {
                    let absorbed: i64 = event
                        .field("shieldsConsumed")
                        .and_then(serde_json::Value::as_array)
                        .map(|shields| {
                            shields
                                .iter()
                                .filter_map(|s| s.get("absorbed").and_then(serde_json::Value::as_i64))
                                .sum()
                        })
                        .unwrap_or(0);
                    f.shield = (f.shield - absorbed).max(0);
                    f.health -= event.int_field("actualDamage", 0);
                }
            }
            "ATTACK_PREPARED" => {
                if let Ok(attack) = event.parse_payload::<PendingAttack>() {
                    if let Some(f) = core.fighters.try_get_mut(attack.attacker) {
                        f.attacked = true;
                    }
                    core.pending_attack = Some(attack);
                }
            }
            "ATTACK_RESOLVED" => core.pending_attack = None,
            TURN_ENDED => {
                for (_, f) in core.fighters.iter_mut() {
                    f.attacked = false;
                }
            }
            _ => {}
        }
    }

    fn on_phase_enter(
        &self,
        phase: &PhaseId,
        ctx: &mut CommandContext<'_, DuelCore>,
    ) -> Result<(), RejectionReason> {
        if phase != "draw" {
            return Ok(());
        }

        let player = ctx.state().current_player();
        let f = fighter(ctx, player)?;
        if !f.is_alive() {
            return Ok(());
        }
        let drawn = f.deck.front().filter(|_| f.hand.len() < MAX_HAND).cloned();
        let gain = ENERGY_PER_TURN.min(MAX_ENERGY - f.energy);

        if let Some(card_id) = drawn {
            ctx.emit("CARD_DRAWN", json!({ "playerId": player, "cardId": card_id }));
        }
        if gain > 0 {
            ctx.emit("ENERGY_GAINED", json!({ "playerId": player, "delta": gain }));
        }
        Ok(())
    }

    /// Eliminated fighters lose their turns.
    fn next_player(&self, state: &MatchState<DuelCore>, player: PlayerId) -> PlayerId {
        next_living(state, player).unwrap_or_else(|| state.next_player_after(player))
    }

    fn is_game_over(&self, state: &MatchState<DuelCore>) -> Option<GameResult> {
        let living: Vec<PlayerId> = state.core().living().collect();
        match living.as_slice() {
            [] => Some(GameResult::Draw),
            [winner] => Some(GameResult::Winner(*winner)),
            _ => None,
        }
    }

    fn action_log(&self) -> Option<&dyn ActionLogFormatter<DuelCore>> {
        Some(&self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Command;
    use crate::processor::CommandProcessor;

    fn p(i: u8) -> PlayerId {
        PlayerId::new(i)
    }

    fn processor() -> CommandProcessor<DuelGame> {
        CommandProcessor::new(DuelGame::new())
    }

    fn run(
        processor: &CommandProcessor<DuelGame>,
        state: &MatchState<DuelCore>,
        commands: &[Command],
    ) -> MatchState<DuelCore> {
        commands.iter().fold(state.clone(), |state, cmd| {
            processor.apply(&state, cmd).unwrap().0
        })
    }

    fn with_hand(state: &mut MatchState<DuelCore>, player: PlayerId, cards: &[&str]) {
        state.core.fighters[player].hand = cards.iter().map(|c| c.to_string()).collect();
    }

    fn advance(player: u8) -> Command {
        Command::new("ADVANCE_PHASE", p(player))
    }

    #[test]
    fn test_setup_deals_opening_hands() {
        let state = processor().initial_state(&MatchConfig::new(2).with_seed(3));
        for (_, f) in state.core().fighters.iter() {
            assert_eq!(f.hand.len(), OPENING_HAND);
            assert_eq!(f.deck.len(), STARTING_DECK.len() - OPENING_HAND);
            assert_eq!(f.health, STARTING_HEALTH);
        }
        assert_eq!(state.phase(), "draw");
    }

    #[test]
    fn test_setup_is_deterministic() {
        let a = processor().initial_state(&MatchConfig::new(2).with_seed(11));
        let b = processor().initial_state(&MatchConfig::new(2).with_seed(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_play_strike_damages_opponent() {
        let processor = processor();
        let mut state = run(&processor, &processor.initial_state(&MatchConfig::new(2)), &[advance(0)]);
        with_hand(&mut state, p(0), &["strike"]);

        let cmd = Command::new(PLAY_CARD, p(0)).with_payload(json!({ "cardId": "strike" }));
        let (state, events) = processor.apply(&state, &cmd).unwrap();

        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["ENERGY_SPENT", "CARD_PLAYED", "DAMAGE_DEALT"]);
        assert_eq!(state.core().fighters[p(1)].health, STARTING_HEALTH - 2);
        assert_eq!(state.core().fighters[p(0)].energy, STARTING_ENERGY - 1);
        assert!(state.core().fighters[p(0)].hand.is_empty());
        assert_eq!(state.core().fighters[p(0)].discard.len(), 1);
    }

    #[test]
    fn test_play_card_rejections() {
        let processor = processor();
        let mut state = run(&processor, &processor.initial_state(&MatchConfig::new(2)), &[advance(0)]);
        with_hand(&mut state, p(0), &["strike", "fireball"]);
        state.core.fighters[p(0)].energy = 2;

        let play = |card: &str| Command::new(PLAY_CARD, p(0)).with_payload(json!({ "cardId": card }));

        assert_eq!(
            processor.apply(&state, &play("mend")).unwrap_err(),
            RejectionReason::IllegalTarget
        );
        assert_eq!(
            processor.apply(&state, &play("fireball")).unwrap_err(),
            RejectionReason::InsufficientResource
        );

        let at_self = Command::new(PLAY_CARD, p(0))
            .with_payload(json!({ "cardId": "strike", "targetPlayerId": "0" }));
        assert_eq!(
            processor.apply(&state, &at_self).unwrap_err(),
            RejectionReason::IllegalTarget
        );

        let off_phase = run(&processor, &state, &[advance(0)]);
        assert_eq!(
            processor.apply(&off_phase, &play("strike")).unwrap_err(),
            RejectionReason::InvalidPhase
        );
    }

    #[test]
    fn test_barrier_absorbs_damage() {
        let processor = processor();
        let mut state = run(&processor, &processor.initial_state(&MatchConfig::new(2)), &[advance(0)]);
        with_hand(&mut state, p(0), &["fireball"]);
        state.core.fighters[p(1)].shield = 3;

        let cmd = Command::new(PLAY_CARD, p(0)).with_payload(json!({ "cardId": "fireball" }));
        let (state, events) = processor.apply(&state, &cmd).unwrap();

        let damage = events.iter().find(|e| e.is("DAMAGE_DEALT")).unwrap();
        assert_eq!(damage.int_field("actualDamage", 0), 2);
        assert_eq!(state.core().fighters[p(1)].shield, 0);
        assert_eq!(state.core().fighters[p(1)].health, STARTING_HEALTH - 2);
    }

    #[test]
    fn test_attack_flow_and_guard() {
        let processor = processor();
        let state = run(
            &processor,
            &processor.initial_state(&MatchConfig::new(2).with_seed(5)),
            &[advance(0), advance(0), Command::new(ROLL_ATTACK, p(0))],
        );
        assert_eq!(state.phase(), "combat");
        let attack = state.core().pending_attack.clone().unwrap();
        assert_eq!(attack.dice.len(), ATTACK_DICE);

        assert_eq!(
            processor.apply(&state, &advance(0)).unwrap_err(),
            RejectionReason::GuardFailed("attackResolved".into())
        );
        assert_eq!(
            processor
                .apply(&state, &Command::new(ROLL_ATTACK, p(0)))
                .unwrap_err(),
            RejectionReason::InsufficientResource
        );

        let (state, events) = processor
            .apply(&state, &Command::new(RESOLVE_ATTACK, p(0)))
            .unwrap();
        assert!(events.iter().any(|e| e.is("ATTACK_RESOLVED")));
        assert!(state.core().pending_attack.is_none());
        assert_eq!(
            state.core().fighters[p(1)].health,
            STARTING_HEALTH - attack.total()
        );

        let (state, _) = processor.apply(&state, &advance(0)).unwrap();
        assert_eq!(state.phase(), "main2");
    }

    #[test]
    fn test_resolve_without_roll_rejected() {
        let processor = processor();
        let state = run(
            &processor,
            &processor.initial_state(&MatchConfig::new(2)),
            &[advance(0), advance(0)],
        );
        assert_eq!(
            processor
                .apply(&state, &Command::new(RESOLVE_ATTACK, p(0)))
                .unwrap_err(),
            RejectionReason::IllegalTarget
        );
    }

    #[test]
    fn test_draw_phase_refills_next_player() {
        let processor = processor();
        let initial = processor.initial_state(&MatchConfig::new(2));
        let (state, events) = processor
            .apply(&initial, &Command::new("END_TURN", p(0)))
            .unwrap();

        assert_eq!(state.current_player(), p(1));
        assert!(events.iter().any(|e| e.is("CARD_DRAWN")));
        let f = &state.core().fighters[p(1)];
        assert_eq!(f.hand.len(), OPENING_HAND + 1);
        assert_eq!(f.energy, STARTING_ENERGY + ENERGY_PER_TURN);
    }

    #[test]
    fn test_lethal_damage_ends_match() {
        let processor = processor();
        let mut state = run(&processor, &processor.initial_state(&MatchConfig::new(2)), &[advance(0)]);
        with_hand(&mut state, p(0), &["strike"]);
        state.core.fighters[p(1)].health = 2;

        let cmd = Command::new(PLAY_CARD, p(0)).with_payload(json!({ "cardId": "strike" }));
        let (state, events) = processor.apply(&state, &cmd).unwrap();

        assert_eq!(state.game_over(), Some(&GameResult::Winner(p(0))));
        assert!(events.last().unwrap().is("MATCH_ENDED"));
        assert_eq!(
            processor.apply(&state, &advance(0)).unwrap_err(),
            RejectionReason::MatchOver
        );
    }

    #[test]
    fn test_eliminated_fighter_is_skipped() {
        let processor = processor();
        let mut state = processor.initial_state(&MatchConfig::new(3));
        state.core.fighters[p(1)].health = 0;

        let (state, events) = processor
            .apply(&state, &Command::new("END_TURN", p(0)))
            .unwrap();
        assert_eq!(state.current_player(), p(2));
        assert_eq!(events[0].str_field("nextPlayerId"), Some("2"));
        assert!(state.game_over().is_none());

        let (state, _) = processor
            .apply(&state, &Command::new("END_TURN", p(2)))
            .unwrap();
        assert_eq!(state.current_player(), p(0));
    }

    /// Combat state whose fighter table only covers seat 0.
    fn shrunk_table(processor: &CommandProcessor<DuelGame>) -> MatchState<DuelCore> {
        let mut state = run(
            processor,
            &processor.initial_state(&MatchConfig::new(2)),
            &[advance(0), advance(0)],
        );
        let solo = state.core().fighters[p(0)].clone();
        state.core.fighters = PlayerMap::new(1, |_| solo.clone());
        state
    }

    #[test]
    fn test_missing_fighters_are_rejected() {
        let processor = processor();
        let state = shrunk_table(&processor);

        assert_eq!(
            processor
                .apply(&state, &Command::new(ROLL_ATTACK, p(0)))
                .unwrap_err(),
            RejectionReason::IllegalTarget
        );

        let mut pending = state.clone();
        pending.core.pending_attack = Some(PendingAttack {
            attacker: p(0),
            target: p(1),
            dice: DiceRoll::from_slice(&[6, 6, 6]),
            base: 6,
            modifiers: Vec::new(),
        });
        assert_eq!(
            processor
                .apply(&pending, &Command::new(RESOLVE_ATTACK, p(0)))
                .unwrap_err(),
            RejectionReason::IllegalTarget
        );

        // Nobody left alive: the turn passes to seat 1, which has no fighter.
        let mut dead = state.clone();
        dead.core.fighters[p(0)].health = 0;
        assert_eq!(
            processor
                .apply(&dead, &Command::new("END_TURN", p(0)))
                .unwrap_err(),
            RejectionReason::InvalidActor
        );
    }

    #[test]
    fn test_attack_modifiers() {
        assert!(attack_modifiers(&[1, 2, 3]).is_empty());
        assert_eq!(attack_modifiers(&[4, 2, 4])[0].modifier_type, "pair");
        let triple = attack_modifiers(&[6, 6, 6]);
        assert_eq!(triple[0].modifier_type, "triple");
        assert_eq!(triple[0].value, 4);
    }
}

//! Duel action-log formatting and messages.
//!
//! One entry per logged fact of a command:
//! - `PLAY_CARD`: the play, then its damage, shield or heal
//! - `ROLL_ATTACK`: the dice
//! - `RESOLVE_ATTACK`: the hit with its breakdown
//! - any command: draws, phase changes, turn ends and the match result
//!
//! Ready toggles are never logged.

use super::cards;
use super::game::{DuelCore, PLAY_CARD, RESOLVE_ATTACK, ROLL_ATTACK};
use crate::actionlog::{
    build_damage_breakdown, damage_source_annotation, total_healing_to, ActionLogEntry,
    ActionLogFormatter, ActionLogSegment, BreakdownOptions, CardSegment, DamageLogPayload,
    FormatContext, I18nSegment, MessageCatalog, SourceLabel, DAMAGE_FROM_KEY,
};
use crate::core::{GameEvent, PlayerId};
use crate::flow::{MATCH_ENDED, PHASE_ADVANCED, TURN_ENDED};
use crate::rules::GameResult;

/// Message namespace of the duel.
pub const NS: &str = "duel";

/// Resolves duel damage sources to card names and attack labels.
pub fn duel_sources(source_id: &str) -> Option<SourceLabel> {
    if source_id == "attack" {
        return Some(SourceLabel::key(NS, "source.attack"));
    }
    cards::card(source_id).map(|card| SourceLabel::key(NS, card.name_key()))
}

fn card_segment(card_id: &str) -> Option<ActionLogSegment> {
    cards::card(card_id)
        .map(|card| CardSegment::new(card.id).with_preview(NS, card.name_key()).into())
}

fn message(key: &str) -> I18nSegment {
    I18nSegment::new(NS, key)
}

/// Formatter for the duel.
#[derive(Clone, Copy, Debug, Default)]
pub struct DuelLog;

impl DuelLog {
    fn damage(&self, event: &GameEvent) -> Vec<ActionLogSegment> {
        let payload = DamageLogPayload::from_event(event).unwrap_or_default();
        let damage = payload.damage.unwrap_or_else(|| event.int_field("amount", 0));
        let actual = event.int_field("actualDamage", damage);

        let mut segments: Vec<ActionLogSegment> = vec![message("log.damage")
            .param("targetPlayerId", event.str_field("targetId").unwrap_or_default())
            .param("amount", actual)
            .into()];
        segments.push(build_damage_breakdown(
            damage,
            &payload,
            &duel_sources,
            Some(NS),
            &BreakdownOptions::default(),
        ));
        let card: &dyn Fn(&str) -> Option<ActionLogSegment> = &card_segment;
        segments.extend(damage_source_annotation(
            &payload,
            &duel_sources,
            NS,
            DAMAGE_FROM_KEY,
            Some(card),
        ));
        segments
    }

    fn play_card(&self, ctx: &FormatContext<'_, DuelCore>) -> Vec<(&'static str, Vec<ActionLogSegment>)> {
        let Some(played) = ctx.find_event("CARD_PLAYED") else {
            return Vec::new();
        };
        let card_id = played.str_field("cardId").unwrap_or_default();
        let mut play: Vec<ActionLogSegment> = vec![message("log.playCard")
            .param("playerId", ctx.command.player_id)
            .into()];
        play.extend(card_segment(card_id));

        let mut entries = vec![("playCard", play)];
        if let Some(hit) = ctx.find_event("DAMAGE_DEALT") {
            entries.push(("damage", self.damage(hit)));
        }
        if let Some(shield) = ctx.find_event("SHIELD_GAINED") {
            entries.push((
                "shield",
                vec![message("log.shield")
                    .param("playerId", ctx.command.player_id)
                    .param("amount", shield.int_field("amount", 0))
                    .into()],
            ));
        }
        if ctx.find_event("HEAL_APPLIED").is_some() {
            let healed = total_healing_to(ctx.events, &ctx.command.player_id.to_string());
            entries.push((
                "heal",
                vec![message("log.heal")
                    .param("playerId", ctx.command.player_id)
                    .param("amount", healed)
                    .into()],
            ));
        }
        entries
    }

    fn flow_event(&self, event: &GameEvent) -> Option<(&'static str, Vec<ActionLogSegment>)> {
        let segment: ActionLogSegment = match event.event_type.as_str() {
            "CARD_DRAWN" => message("log.draw")
                .param("playerId", event.str_field("playerId").unwrap_or_default())
                .into(),
            PHASE_ADVANCED => {
                let to = event.str_field("to").unwrap_or_default();
                message("log.phase")
                    .param("phase", format!("phase.{to}"))
                    .translate_param("phase")
                    .into()
            }
            TURN_ENDED => message("log.turnEnded")
                .param("playerId", event.str_field("playerId").unwrap_or_default())
                .param("nextPlayerId", event.str_field("nextPlayerId").unwrap_or_default())
                .into(),
            MATCH_ENDED => match event
                .field("result")
                .cloned()
                .and_then(|r| serde_json::from_value::<GameResult>(r).ok())
            {
                Some(GameResult::Winner(winner)) => message("log.winner").param("playerId", winner).into(),
                Some(GameResult::Winners(winners)) => message("log.winners")
                    .param(
                        "players",
                        winners.iter().map(PlayerId::to_string).collect::<Vec<_>>().join(", "),
                    )
                    .into(),
                _ => message("log.draw.match").into(),
            },
            _ => return None,
        };

        let kind = match event.event_type.as_str() {
            "CARD_DRAWN" => "draw",
            PHASE_ADVANCED => "phase",
            TURN_ENDED => "turnEnded",
            _ => "matchEnded",
        };
        Some((kind, vec![segment]))
    }
}

impl ActionLogFormatter<DuelCore> for DuelLog {
    fn format(&self, ctx: &FormatContext<'_, DuelCore>) -> Vec<ActionLogEntry> {
        let mut entries = match ctx.command.command_type.as_str() {
            PLAY_CARD => self.play_card(ctx),
            ROLL_ATTACK => ctx
                .find_event("DICE_ROLLED")
                .and_then(|rolled| {
                    let dice: Vec<u8> = serde_json::from_value(rolled.field("dice")?.clone()).ok()?;
                    Some(vec![(
                        "rollAttack",
                        vec![
                            message("log.rollAttack")
                                .param("playerId", ctx.command.player_id)
                                .into(),
                            ActionLogSegment::dice(dice),
                        ],
                    )])
                })
                .unwrap_or_default(),
            RESOLVE_ATTACK => ctx
                .find_event("DAMAGE_DEALT")
                .map(|hit| vec![("attack", self.damage(hit))])
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        entries.extend(ctx.events.iter().filter_map(|e| self.flow_event(e)));

        entries
            .into_iter()
            .enumerate()
            .map(|(i, (kind, segments))| ctx.entry(i, kind, segments))
            .collect()
    }
}

const EN: &[(&str, &str)] = &[
    ("log.playCard", "{{playerId}} plays"),
    ("log.damage", "{{targetPlayerId}} takes {{amount}} damage"),
    ("log.shield", "{{playerId}} gains {{amount}} shield"),
    ("log.heal", "{{playerId}} heals {{amount}}"),
    ("log.rollAttack", "{{playerId}} rolls to attack:"),
    ("log.draw", "{{playerId}} draws a card"),
    ("log.phase", "Phase: {{phase}}"),
    ("log.turnEnded", "{{playerId}} ends the turn, {{nextPlayerId}} is up"),
    ("log.winner", "{{playerId}} wins the duel"),
    ("log.winners", "{{players}} share the win"),
    ("log.draw.match", "The duel ends in a draw"),
    ("actionLog.damageFrom", "from"),
    ("actionLog.damageSource.original", "Base"),
    ("source.attack", "Attack"),
    ("modifier.pair", "Pair"),
    ("modifier.triple", "Triple"),
    ("card.strike.name", "Strike"),
    ("card.fireball.name", "Fireball"),
    ("card.barrier.name", "Barrier"),
    ("card.mend.name", "Mend"),
    ("phase.draw", "Draw"),
    ("phase.main1", "Main 1"),
    ("phase.combat", "Combat"),
    ("phase.main2", "Main 2"),
    ("phase.end", "End"),
];

const DE: &[(&str, &str)] = &[
    ("log.playCard", "{{playerId}} spielt"),
    ("log.damage", "{{targetPlayerId}} erleidet {{amount}} Schaden"),
    ("log.shield", "{{playerId}} erhält {{amount}} Schild"),
    ("log.heal", "{{playerId}} heilt {{amount}}"),
    ("log.rollAttack", "{{playerId}} würfelt für einen Angriff:"),
    ("log.draw", "{{playerId}} zieht eine Karte"),
    ("log.phase", "Phase: {{phase}}"),
    ("log.turnEnded", "{{playerId}} beendet den Zug, {{nextPlayerId}} ist dran"),
    ("log.winner", "{{playerId}} gewinnt das Duell"),
    ("log.winners", "{{players}} teilen sich den Sieg"),
    ("log.draw.match", "Das Duell endet unentschieden"),
    ("actionLog.damageFrom", "durch"),
    ("actionLog.damageSource.original", "Basis"),
    ("source.attack", "Angriff"),
    ("modifier.pair", "Pasch"),
    ("modifier.triple", "Drilling"),
    ("card.strike.name", "Hieb"),
    ("card.fireball.name", "Feuerball"),
    ("card.barrier.name", "Barriere"),
    ("card.mend.name", "Heilung"),
    ("phase.draw", "Ziehen"),
    ("phase.main1", "Hauptphase 1"),
    ("phase.combat", "Kampf"),
    ("phase.main2", "Hauptphase 2"),
    ("phase.end", "Ende"),
];

/// Duel messages for `locale` (`"en"` or `"de"`). Unknown locales get English.
#[must_use]
pub fn message_catalog(locale: &str) -> MessageCatalog {
    let table = if locale == "de" { DE } else { EN };
    table
        .iter()
        .fold(MessageCatalog::new(locale), |catalog, (key, template)| {
            catalog.with(NS, key, *template)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actionlog::render_segments;
    use crate::core::{Command, MatchConfig, MatchState};
    use crate::games::duel::DuelGame;
    use crate::processor::CommandProcessor;
    use serde_json::json;

    fn p(i: u8) -> PlayerId {
        PlayerId::new(i)
    }

    fn format(
        processor: &CommandProcessor<DuelGame>,
        state: &MatchState<DuelCore>,
        cmd: &Command,
    ) -> (MatchState<DuelCore>, Vec<ActionLogEntry>) {
        let (next, events) = processor.apply(state, cmd).unwrap();
        let entries = DuelLog.format(&FormatContext::new(cmd, &events, &next));
        (next, entries)
    }

    fn in_main1() -> (CommandProcessor<DuelGame>, MatchState<DuelCore>) {
        let processor = CommandProcessor::new(DuelGame::new());
        let initial = processor.initial_state(&MatchConfig::new(2));
        let (state, _) = processor
            .apply(&initial, &Command::new("ADVANCE_PHASE", p(0)))
            .unwrap();
        (processor, state)
    }

    #[test]
    fn test_play_card_entries() {
        let (processor, mut state) = in_main1();
        state.core.fighters[p(0)].hand = vec!["fireball".to_string()].into_iter().collect();
        state.core.fighters[p(1)].shield = 1;

        let cmd = Command::new(PLAY_CARD, p(0)).with_payload(json!({ "cardId": "fireball" }));
        let (_, entries) = format(&processor, &state, &cmd);

        let kinds: Vec<&str> = entries.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["playCard", "damage"]);
        assert_eq!(entries[0].id, "2-0");
        assert_eq!(entries[1].id, "2-1");

        let en = message_catalog("en");
        assert_eq!(render_segments(&entries[0].segments, &en), "0 plays Fireball");
        assert_eq!(
            render_segments(&entries[1].segments, &en),
            "1 takes 4 damage 5 from Fireball"
        );
    }

    #[test]
    fn test_breakdown_lists_shield() {
        let (processor, mut state) = in_main1();
        state.core.fighters[p(0)].hand = vec!["strike".to_string()].into_iter().collect();
        state.core.fighters[p(1)].shield = 1;

        let cmd = Command::new(PLAY_CARD, p(0)).with_payload(json!({ "cardId": "strike" }));
        let (_, entries) = format(&processor, &state, &cmd);

        let breakdown = entries[1]
            .segments
            .iter()
            .find_map(|s| match s {
                ActionLogSegment::Breakdown(b) => Some(b),
                _ => None,
            })
            .unwrap();
        assert_eq!(breakdown.lines.len(), 2);
        assert_eq!(breakdown.lines[0].label, "card.strike.name");
        assert_eq!(breakdown.lines[1].value, -1);
    }

    #[test]
    fn test_roll_attack_logs_dice() {
        let (processor, state) = in_main1();
        let (state, _) = processor
            .apply(&state, &Command::new("ADVANCE_PHASE", p(0)))
            .unwrap();
        let (state, entries) = format(&processor, &state, &Command::new(ROLL_ATTACK, p(0)));

        let rolled = &state.core().pending_attack.as_ref().unwrap().dice;
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].segments[1],
            ActionLogSegment::dice(rolled.iter().copied())
        );
    }

    #[test]
    fn test_set_ready_not_logged() {
        let (processor, state) = in_main1();
        let (_, entries) = format(&processor, &state, &Command::new("SET_READY", p(1)));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_end_turn_logs_flow() {
        let (processor, state) = in_main1();
        let (_, entries) = format(&processor, &state, &Command::new("END_TURN", p(0)));

        let kinds: Vec<&str> = entries.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["turnEnded", "phase", "draw"]);

        let de = message_catalog("de");
        assert_eq!(render_segments(&entries[1].segments, &de), "Phase: Ziehen");
    }

    #[test]
    fn test_sources() {
        assert_eq!(duel_sources("attack"), Some(SourceLabel::key(NS, "source.attack")));
        assert_eq!(
            duel_sources("mend"),
            Some(SourceLabel::key(NS, "card.mend.name"))
        );
        assert!(duel_sources("curse").is_none());
    }
}

//! Turn and phase flow tests.
//!
//! Phase walking, turn rotation, guards and phase hooks, all through
//! `CommandProcessor::apply`.

use serde_json::json;

use tabletop_engine::flow::MAX_AUTO_ADVANCES;
use tabletop_engine::games::simple::{SimpleGame, SimpleGameBuilder, PHASES};
use tabletop_engine::{
    Command, CommandContext, CommandProcessor, FlowConfig, FlowGuard, Game, GameEvent, GameRng,
    HandlerTable, MatchConfig, MatchState, PhaseId, PlayerId, RejectionReason,
};

fn p(i: u8) -> PlayerId {
    PlayerId::new(i)
}

fn advance(player: u8) -> Command {
    Command::new("ADVANCE_PHASE", p(player))
}

/// Advancing from the terminal phase ends the turn.
#[test]
fn test_advance_from_terminal_phase_ends_turn() {
    let processor = CommandProcessor::new(SimpleGame::new());
    let mut state = processor.initial_state(&MatchConfig::new(2));
    for _ in 0..2 {
        state = processor.apply(&state, &advance(0)).unwrap().0;
    }
    assert_eq!(state.phase(), "end");

    let (state, events) = processor.apply(&state, &advance(0)).unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, "TURN_ENDED");
    assert_eq!(
        events[0].payload,
        json!({ "playerId": "0", "nextPlayerId": "1", "turnNumber": 1 })
    );
    assert_eq!(events[1].payload, json!({ "from": "end", "to": "main1" }));
    assert_eq!(state.current_player(), p(1));
    assert_eq!(state.turn_number(), 2);
    assert_eq!(state.phase(), "main1");
}

/// `END_TURN` works from any phase.
#[test]
fn test_end_turn_from_first_phase() {
    let processor = CommandProcessor::new(SimpleGame::new());
    let state = processor.initial_state(&MatchConfig::new(2));

    let (state, events) = processor
        .apply(&state, &Command::new("END_TURN", p(0)))
        .unwrap();

    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["TURN_ENDED", "PHASE_ADVANCED"]);
    assert_eq!(events[1].payload, json!({ "from": "main1", "to": "main1" }));
    assert_eq!(state.current_player(), p(1));
}

/// Turns rotate cyclically from the configured starting seat.
#[test]
fn test_turn_rotation_from_starting_player() {
    let processor = CommandProcessor::new(SimpleGame::new());
    let mut state = processor.initial_state(&MatchConfig::new(3).with_starting_player(p(2)));
    assert_eq!(state.player_order(), &[p(2), p(0), p(1)]);

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(state.current_player());
        let cmd = Command::new("END_TURN", state.current_player());
        state = processor.apply(&state, &cmd).unwrap().0;
    }

    assert_eq!(seen, vec![p(2), p(0), p(1), p(2)]);
    assert_eq!(state.turn_number(), 5);
}

/// A failing guard rejects the transition and leaves the state untouched.
#[test]
fn test_guard_blocks_transition() {
    let processor = CommandProcessor::new(SimpleGameBuilder::new().with_gate().build());
    let state = processor.initial_state(&MatchConfig::new(2));

    for cmd in [advance(0), Command::new("END_TURN", p(0))] {
        assert_eq!(
            processor.apply(&state, &cmd).unwrap_err(),
            RejectionReason::GuardFailed("gateOpen".into())
        );
    }

    let (open, _) = processor.apply(&state, &Command::new("UNLOCK", p(0))).unwrap();
    let (next, _) = processor.apply(&open, &advance(0)).unwrap();
    assert_eq!(next.phase(), "main2");

    // Scoped to leaving main1 only.
    let (relocked, _) = processor.apply(&next, &Command::new("LOCK", p(0))).unwrap();
    assert!(processor.apply(&relocked, &advance(0)).is_ok());
}

/// Guards are evaluated in registration order; the first failure wins.
#[test]
fn test_guard_order() {
    let flow: FlowConfig<i64> = FlowConfig::new(&["a", "b"])
        .with_guard(FlowGuard::new("positive", |n: &i64| *n > 0))
        .with_guard(FlowGuard::new("even", |n: &i64| n % 2 == 0))
        .with_guard(FlowGuard::new("small", |n: &i64| *n < 10).leaving("b"));
    let a = PhaseId::new("a");

    assert_eq!(
        flow.check_guards(&-1, &a),
        Err(RejectionReason::GuardFailed("positive".into()))
    );
    assert_eq!(
        flow.check_guards(&3, &a),
        Err(RejectionReason::GuardFailed("even".into()))
    );
    assert_eq!(flow.check_guards(&12, &a), Ok(()));
    assert_eq!(
        flow.check_guards(&12, &PhaseId::new("b")),
        Err(RejectionReason::GuardFailed("small".into()))
    );
}

/// Records every event type it sees; rejects entering phase `c`.
struct HookGame;

impl Game for HookGame {
    type Core = Vec<String>;

    fn id(&self) -> &'static str {
        "hooks"
    }

    fn setup(&self, _config: &MatchConfig, _rng: &mut GameRng) -> Vec<String> {
        Vec::new()
    }

    fn flow(&self) -> FlowConfig<Vec<String>> {
        FlowConfig::new(&["a", "b", "c"])
    }

    fn handlers(&self) -> HandlerTable<Vec<String>> {
        HandlerTable::new()
    }

    fn reduce(&self, core: &mut Vec<String>, event: &GameEvent) {
        core.push(event.event_type.clone());
    }

    fn on_phase_exit(
        &self,
        phase: &PhaseId,
        ctx: &mut CommandContext<'_, Vec<String>>,
    ) -> Result<(), RejectionReason> {
        ctx.emit("LEFT", json!({ "phase": phase }));
        Ok(())
    }

    fn on_phase_enter(
        &self,
        phase: &PhaseId,
        ctx: &mut CommandContext<'_, Vec<String>>,
    ) -> Result<(), RejectionReason> {
        if phase == "c" {
            return Err(RejectionReason::IllegalTarget);
        }
        ctx.emit("ENTERED", json!({ "phase": phase }));
        Ok(())
    }
}

/// Exit hooks run before the transition event, enter hooks after it.
#[test]
fn test_phase_hooks_order() {
    let processor = CommandProcessor::new(HookGame);
    let state = processor.initial_state(&MatchConfig::new(1));

    let (state, events) = processor.apply(&state, &advance(0)).unwrap();

    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["LEFT", "PHASE_ADVANCED", "ENTERED"]);
    assert_eq!(state.core(), &vec!["LEFT", "PHASE_ADVANCED", "ENTERED"]);
}

/// A hook rejection discards the whole transition.
#[test]
fn test_hook_rejection_is_atomic() {
    let processor = CommandProcessor::new(HookGame);
    let state = processor.initial_state(&MatchConfig::new(1));
    let (in_b, _) = processor.apply(&state, &advance(0)).unwrap();

    let err = processor.apply(&in_b, &advance(0)).unwrap_err();

    assert_eq!(err, RejectionReason::IllegalTarget);
    assert_eq!(in_b.phase(), "b");
    assert_eq!(in_b.core().len(), 3);
}

/// A single-seat match hands the turn back to the same seat.
#[test]
fn test_single_player_rotation() {
    let processor = CommandProcessor::new(HookGame);
    let state = processor.initial_state(&MatchConfig::new(1));

    let (state, events) = processor
        .apply(&state, &Command::new("END_TURN", p(0)))
        .unwrap();

    let ended = events.iter().find(|e| e.is("TURN_ENDED")).unwrap();
    assert_eq!(ended.payload["nextPlayerId"], json!("0"));
    assert_eq!(state.current_player(), p(0));
    assert_eq!(state.turn_number(), 2);
}

fn phase_changes(events: &[GameEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter(|e| e.is("PHASE_ADVANCED"))
        .map(|e| {
            (
                e.str_field("from").unwrap_or_default().to_string(),
                e.str_field("to").unwrap_or_default().to_string(),
            )
        })
        .collect()
}

/// A phase with nothing to do is left without another command.
#[test]
fn test_empty_phase_is_skipped() {
    let processor = CommandProcessor::new(SimpleGameBuilder::new().auto_skip(&["main2"]).build());
    let state = processor.initial_state(&MatchConfig::new(2));

    let (state, events) = processor.apply(&state, &advance(0)).unwrap();

    assert_eq!(
        phase_changes(&events),
        vec![
            ("main1".to_string(), "main2".to_string()),
            ("main2".to_string(), "end".to_string()),
        ]
    );
    assert_eq!(state.phase(), "end");
    assert_eq!(state.command_count(), 1);
}

/// Any accepted command can trigger the skip, not only flow commands.
#[test]
fn test_skip_after_game_command() {
    let processor = CommandProcessor::new(SimpleGameBuilder::new().auto_skip(&["main1"]).build());
    let state = processor.initial_state(&MatchConfig::new(2));

    let (state, events) = processor.apply(&state, &Command::new("SCORE", p(0))).unwrap();

    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["SCORED", "PHASE_ADVANCED"]);
    assert_eq!(state.phase(), "main2");
}

/// A failing guard ends the chain but keeps the command.
#[test]
fn test_guard_stops_skip_chain() {
    let processor = CommandProcessor::new(
        SimpleGameBuilder::new().with_gate().auto_skip(&["main1"]).build(),
    );
    let state = processor.initial_state(&MatchConfig::new(2));

    let (state, events) = processor.apply(&state, &Command::new("SCORE", p(0))).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(state.phase(), "main1");
    assert_eq!(state.core().scores[p(0)], 1);

    let (state, events) = processor.apply(&state, &Command::new("UNLOCK", p(0))).unwrap();
    assert_eq!(phase_changes(&events), vec![("main1".to_string(), "main2".to_string())]);
    assert_eq!(state.phase(), "main2");
}

/// Skipping every phase stops after the advance limit.
#[test]
fn test_auto_advance_is_bounded() {
    let processor = CommandProcessor::new(SimpleGameBuilder::new().auto_skip(&PHASES).build());
    let state = processor.initial_state(&MatchConfig::new(2));

    let (state, events) = processor.apply(&state, &advance(0)).unwrap();

    assert_eq!(phase_changes(&events).len(), 1 + MAX_AUTO_ADVANCES);
    assert_eq!(events.iter().filter(|e| e.is("TURN_ENDED")).count(), 5);
    assert_eq!(state.turn_number(), 6);
    assert_eq!(state.current_player(), p(1));
    assert_eq!(state.phase(), "end");
}

/// Hands turns to even seats only.
struct SkipOddSeats;

impl Game for SkipOddSeats {
    type Core = ();

    fn id(&self) -> &'static str {
        "even-seats"
    }

    fn setup(&self, _config: &MatchConfig, _rng: &mut GameRng) {}

    fn flow(&self) -> FlowConfig<()> {
        FlowConfig::new(&["only"])
    }

    fn handlers(&self) -> HandlerTable<()> {
        HandlerTable::new()
    }

    fn reduce(&self, _core: &mut (), _event: &GameEvent) {}

    fn next_player(&self, state: &MatchState<()>, player: PlayerId) -> PlayerId {
        let mut next = state.next_player_after(player);
        while next.index() % 2 == 1 {
            next = state.next_player_after(next);
        }
        next
    }
}

/// The game decides who takes the next turn.
#[test]
fn test_game_picks_next_player() {
    let processor = CommandProcessor::new(SkipOddSeats);
    let state = processor.initial_state(&MatchConfig::new(4));

    let (state, events) = processor.apply(&state, &Command::new("END_TURN", p(0))).unwrap();
    assert_eq!(events[0].payload["nextPlayerId"], json!("2"));
    assert_eq!(state.current_player(), p(2));

    let (state, _) = processor.apply(&state, &Command::new("END_TURN", p(2))).unwrap();
    assert_eq!(state.current_player(), p(0));
}

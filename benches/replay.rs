use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use tabletop_engine::debug::replay;
use tabletop_engine::games::duel::{DuelGame, RESOLVE_ATTACK, ROLL_ATTACK};
use tabletop_engine::{Command, CommandProcessor, MatchConfig, PlayerId};

/// Commands for `turns` turns of alternating scripted play.
fn scripted_turns(turns: u8) -> Vec<Command> {
    let mut commands = Vec::new();
    for turn in 0..turns {
        let player = PlayerId::new(turn % 2);
        commands.push(Command::new("ADVANCE_PHASE", player));
        commands.push(Command::new("ADVANCE_PHASE", player));
        commands.push(Command::new(ROLL_ATTACK, player).with_payload(json!({})));
        commands.push(Command::new(RESOLVE_ATTACK, player));
        commands.push(Command::new("END_TURN", player));
    }
    commands
}

fn bench_replay(c: &mut Criterion) {
    let processor = CommandProcessor::new(DuelGame::new());
    let initial = processor.initial_state(&MatchConfig::new(2).with_seed(42));
    let commands = scripted_turns(2);

    c.bench_function("replay_duel_two_turns", |b| {
        b.iter(|| replay(&processor, black_box(&initial), black_box(&commands)))
    });

    c.bench_function("fingerprint_initial_state", |b| {
        b.iter(|| black_box(&initial).fingerprint())
    });
}

criterion_group!(benches, bench_replay);
criterion_main!(benches);

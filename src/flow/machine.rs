//! Phase and turn transitions.
//!
//! Advancing from a non-terminal phase:
//! guards -> exit hook -> `PHASE_ADVANCED` -> enter hook.
//!
//! Ending a turn (`END_TURN`, or `ADVANCE_PHASE` from the terminal phase):
//! guards -> exit hook -> `TURN_ENDED` -> `PHASE_ADVANCED` back to the
//! first phase -> enter hook.
//!
//! After the command itself, `auto_advance` keeps advancing while the game
//! reports nothing left to do in the current phase.
//!
//! Everything runs inside the command's context, so a rejection anywhere in
//! the chain discards the whole transition.

use crate::core::error::RejectionReason;
use crate::processor::system::SystemEvent;
use crate::rules::{CommandContext, Game};

use super::guard::FlowConfig;

/// Move to the next phase, or end the turn from the terminal phase.
pub(crate) fn advance_phase<G: Game>(
    game: &G,
    flow: &FlowConfig<G::Core>,
    ctx: &mut CommandContext<'_, G::Core>,
) -> Result<(), RejectionReason> {
    let from = ctx.state().phase().clone();
    let Some(to) = flow.next_phase(&from).cloned() else {
        return end_turn(game, flow, ctx);
    };

    flow.check_guards(ctx.core(), &from)?;
    game.on_phase_exit(&from, ctx)?;
    ctx.emit_system(SystemEvent::PhaseAdvanced {
        from,
        to: to.clone(),
    });
    game.on_phase_enter(&to, ctx)
}

/// End the current player's turn from any phase.
pub(crate) fn end_turn<G: Game>(
    game: &G,
    flow: &FlowConfig<G::Core>,
    ctx: &mut CommandContext<'_, G::Core>,
) -> Result<(), RejectionReason> {
    let from = ctx.state().phase().clone();
    flow.check_guards(ctx.core(), &from)?;
    game.on_phase_exit(&from, ctx)?;

    let player_id = ctx.state().current_player();
    let next_player_id = game.next_player(ctx.state(), player_id);
    let turn_number = ctx.state().turn_number();
    ctx.emit_system(SystemEvent::TurnEnded {
        player_id,
        next_player_id,
        turn_number,
    });

    let first = flow.first_phase().clone();
    ctx.emit_system(SystemEvent::PhaseAdvanced {
        from,
        to: first.clone(),
    });
    game.on_phase_enter(&first, ctx)
}

/// Upper bound on automatic phase advances per command.
pub const MAX_AUTO_ADVANCES: usize = 16;

/// Advance while `Game::auto_continue` asks for it.
///
/// A failing guard or a finished match ends the chain early. Hook
/// rejections still reject the command. Returns the number of advances.
pub(crate) fn auto_advance<G: Game>(
    game: &G,
    flow: &FlowConfig<G::Core>,
    ctx: &mut CommandContext<'_, G::Core>,
) -> Result<usize, RejectionReason> {
    let mut steps = 0;
    while steps < MAX_AUTO_ADVANCES
        && game.is_game_over(ctx.state()).is_none()
        && game.auto_continue(ctx.state())
    {
        if flow.check_guards(ctx.core(), ctx.state().phase()).is_err() {
            break;
        }
        advance_phase(game, flow, ctx)?;
        steps += 1;
    }
    Ok(steps)
}

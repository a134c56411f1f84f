//! Teleport cells - stairwells and lifts modelled as jumps

use crate::actions::Action;
use crate::core::error::Result;
use crate::core::types::CellId;
use crate::grid::cell::CellKind;
use crate::rules::movement::{cross, wait};
use crate::rules::{Rule, RuleContext, RulePhase};

/// Jump to the first free target of a teleport cell
///
/// When every target is occupied the individual waits a step and is
/// flagged; the next attempt clears the flag and leaves the individual to
/// the movement rule instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeleportRule;

impl Rule for TeleportRule {
    fn name(&self) -> &'static str {
        "teleport"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Loop
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        let is_teleport = ctx
            .controller
            .grid()
            .cell(cell)
            .map(|c| matches!(c.kind, CellKind::Teleport { .. }))
            .unwrap_or(false);
        is_teleport
            && ctx
                .occupant(cell)
                .map(|(_, props)| props.alarmed && props.is_ready(ctx.time))
                .unwrap_or(false)
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, props) = ctx.occupant_or_err(cell)?;
        if props.teleport_failed {
            ctx.controller.set_teleport_failed(agent, false)?;
            return Ok(None);
        }

        let targets = match &ctx.controller.grid().cell(cell)?.kind {
            CellKind::Teleport { targets } => targets.clone(),
            _ => return Ok(None),
        };
        let free = targets.into_iter().find(|&t| {
            ctx.controller
                .grid()
                .cell(t)
                .map(|c| !c.is_occupied())
                .unwrap_or(false)
        });

        match free {
            Some(target) => {
                let distance = ctx.sim.config.room_crossing_distance;
                tracing::debug!("{} teleports from {} to {}", agent, cell, target);
                cross(ctx, agent, cell, target, props.direction, distance).map(Some)
            }
            None => {
                ctx.controller.set_teleport_failed(agent, true)?;
                wait(ctx, agent, cell)?;
                Ok(Some(Action::Void))
            }
        }
    }
}

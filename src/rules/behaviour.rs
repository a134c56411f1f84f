//! Loop rules that change how an individual behaves, not where it is

use rand::Rng;

use crate::actions::Action;
use crate::core::error::Result;
use crate::core::types::CellId;
use crate::rules::{face_descent, Rule, RuleContext, RulePhase};

/// Alarm individuals once their reaction time passed or their room is
/// already alarmed; an alarmed individual alarms its room in turn
#[derive(Debug, Default, Clone, Copy)]
pub struct ReactionRule;

impl Rule for ReactionRule {
    fn name(&self) -> &'static str {
        "reaction"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Loop
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        ctx.occupant(cell).map(|(_, props)| !props.alarmed).unwrap_or(false)
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, _) = ctx.occupant_or_err(cell)?;
        let room = ctx.controller.grid().cell(cell)?.room;
        let room_alarmed = ctx.controller.grid().room(room)?.is_alarmed();
        let reaction = ctx.sim.params().reaction_time_steps(ctx.controller.agents().individual(agent)?);

        if room_alarmed || ctx.time >= reaction {
            tracing::debug!("{} reacts at {:.1}", agent, ctx.time);
            Ok(Some(Action::Alarm { agent, room }))
        } else {
            Ok(None)
        }
    }
}

/// Update panic, exhaustion and speed of alarmed individuals
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicRule;

impl Rule for PanicRule {
    fn name(&self) -> &'static str {
        "panic"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Loop
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        ctx.occupant(cell)
            .map(|(agent, props)| props.alarmed && !ctx.controller.agents().is_safe(agent))
            .unwrap_or(false)
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, props) = ctx.occupant_or_err(cell)?;
        let grid = ctx.controller.grid();

        let neighbors = grid.neighbors(cell);
        let blocked = neighbors
            .iter()
            .filter(|(_, n)| grid.cell(*n).map(|c| c.is_occupied()).unwrap_or(false))
            .count();
        let congestion = if neighbors.is_empty() {
            0.0
        } else {
            blocked as f64 / neighbors.len() as f64
        };
        let moving = !props.is_ready(ctx.time);

        let individual = ctx.controller.agents().individual(agent)?.clone();
        let params = ctx.sim.params();

        let mut updated = props;
        updated.panic = params.update_panic(&individual, &updated, congestion);
        updated.exhaustion = params.update_exhaustion(&individual, &updated, moving);
        let speed = params.update_speed(&individual, &updated);

        ctx.controller.set_panic(agent, updated.panic)?;
        ctx.controller.set_exhaustion(agent, updated.exhaustion)?;
        ctx.controller.set_relative_speed(agent, speed)?;
        Ok(None)
    }
}

/// Occasionally give up on the current exit for the best other one
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangePotentialRule;

impl Rule for ChangePotentialRule {
    fn name(&self) -> &'static str {
        "change_potential"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Loop
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        let Some((agent, props)) = ctx.occupant(cell) else {
            return false;
        };
        props.alarmed
            && props.static_potential.is_some()
            && props.is_ready(ctx.time)
            && !ctx.controller.agents().is_safe(agent)
            && ctx.controller.potentials().reaching(cell).count() > 1
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, props) = ctx.occupant_or_err(cell)?;
        let individual = ctx.controller.agents().individual(agent)?;
        let probability = ctx
            .sim
            .params()
            .change_potential_probability(individual, &props)
            .clamp(0.0, 1.0);

        if probability <= 0.0 || !ctx.sim.rng().gen_bool(probability) {
            return Ok(None);
        }

        let best = ctx
            .controller
            .potentials()
            .reaching(cell)
            .filter(|p| Some(p.id) != props.static_potential)
            .filter_map(|p| p.potential(cell).ok().map(|v| (v, p.id)))
            .min()
            .map(|(_, id)| id);

        match best {
            Some(potential) => {
                tracing::debug!("{} switches to {}", agent, potential);
                face_descent(ctx, agent, cell, potential)?;
                Ok(Some(Action::ChangePotential { agent, potential }))
            }
            None => Ok(None),
        }
    }
}

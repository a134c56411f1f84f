//! Primary rules - bind individuals to exits and set their start speed

use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::actions::Action;
use crate::agent::DeathCause;
use crate::core::error::Result;
use crate::core::types::CellId;
use crate::rules::{face_descent, Rule, RuleContext, RulePhase};

fn needs_potential(cell: CellId, ctx: &RuleContext) -> bool {
    ctx.occupant(cell)
        .map(|(_, props)| props.static_potential.is_none())
        .unwrap_or(false)
}

/// Nearest exit by static potential
#[derive(Debug, Default, Clone, Copy)]
pub struct InitialPotentialShortestPathRule;

impl Rule for InitialPotentialShortestPathRule {
    fn name(&self) -> &'static str {
        "initial_potential_shortest_path"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Primary
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        needs_potential(cell, ctx)
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, _) = ctx.occupant_or_err(cell)?;
        match ctx.controller.potentials().nearest(cell) {
            Some(potential) => {
                face_descent(ctx, agent, cell, potential)?;
                Ok(Some(Action::ChangePotential { agent, potential }))
            }
            None => {
                tracing::warn!("{} on {} cannot reach any exit", agent, cell);
                Ok(Some(Action::Die {
                    agent,
                    cause: DeathCause::ExitUnreachable,
                }))
            }
        }
    }
}

/// Exit chosen by attractivity and distance
///
/// Familiar individuals favour attractive exits, unfamiliar ones the
/// closest: `f · attractivity/max_attractivity + (1 − f) · (1 − potential/max_potential)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InitialPotentialAttractivityRule;

impl Rule for InitialPotentialAttractivityRule {
    fn name(&self) -> &'static str {
        "initial_potential_attractivity"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Primary
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        needs_potential(cell, ctx)
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, _) = ctx.occupant_or_err(cell)?;
        let familiarity = ctx.controller.agents().individual(agent)?.familiarity;

        let candidates: Vec<_> = ctx
            .controller
            .potentials()
            .reaching(cell)
            .filter_map(|p| p.potential(cell).ok().map(|v| (p.id, p.attractivity, v)))
            .collect();

        let max_attractivity = candidates.iter().map(|c| c.1).max().unwrap_or(1).max(1) as f64;
        let max_potential = candidates.iter().map(|c| c.2).max().unwrap_or(1).max(1) as f64;

        let chosen = candidates
            .iter()
            .map(|&(id, attractivity, value)| {
                let score = familiarity * attractivity as f64 / max_attractivity
                    + (1.0 - familiarity) * (1.0 - value as f64 / max_potential);
                (id, score)
            })
            .max_by_key(|&(id, score)| (OrderedFloat(score), Reverse(id)))
            .map(|(id, _)| id);

        match chosen {
            Some(potential) => {
                face_descent(ctx, agent, cell, potential)?;
                Ok(Some(Action::ChangePotential { agent, potential }))
            }
            None => {
                tracing::warn!("{} on {} cannot reach any exit", agent, cell);
                Ok(Some(Action::Die {
                    agent,
                    cause: DeathCause::ExitUnreachable,
                }))
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InitialSpeedRule;

impl Rule for InitialSpeedRule {
    fn name(&self) -> &'static str {
        "initial_speed"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Primary
    }

    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool {
        ctx.agent_at(cell).is_some()
    }

    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>> {
        let (agent, _) = ctx.occupant_or_err(cell)?;
        let speed = ctx.sim.params().initial_speed(ctx.controller.agents().individual(agent)?);
        ctx.controller.set_relative_speed(agent, speed)?;
        Ok(None)
    }
}

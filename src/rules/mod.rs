//! Rule engine
//!
//! A rule looks at the individual standing on a cell, decides whether it
//! applies and produces at most one action. Primary rules run once during
//! initialization, loop rules once per step, always in registration order.

pub mod behaviour;
pub mod initial;
pub mod movement;
pub mod teleport;
pub mod terminal;

use crate::actions::{apply, Action};
use crate::agent::AgentProperties;
use crate::core::config::{InitialPotentialPolicy, MovementPolicy, SimulationConfig};
use crate::core::error::{EvacError, Result};
use crate::core::types::{AgentId, CellId, PotentialId, Time};
use crate::simulation::context::SimulationContext;
use crate::state::StateController;
use crate::stats::StatisticsSink;

pub use behaviour::{ChangePotentialRule, PanicRule, ReactionRule};
pub use initial::{InitialPotentialAttractivityRule, InitialPotentialShortestPathRule, InitialSpeedRule};
pub use movement::{BestResponseMovementRule, MovementRule, SimpleMovementRule};
pub use teleport::TeleportRule;
pub use terminal::{EvacuateRule, SaveRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePhase {
    Primary,
    Loop,
    Both,
}

impl RulePhase {
    pub fn is_primary(self) -> bool {
        matches!(self, RulePhase::Primary | RulePhase::Both)
    }

    pub fn is_loop(self) -> bool {
        matches!(self, RulePhase::Loop | RulePhase::Both)
    }
}

pub trait Rule {
    fn name(&self) -> &'static str;

    fn phase(&self) -> RulePhase;

    fn is_movement(&self) -> bool {
        false
    }

    /// Whether the rule applies to the individual on `cell` right now
    fn executable_on(&self, cell: CellId, ctx: &RuleContext) -> bool;

    /// Produce the action for the individual on `cell`
    ///
    /// The returned action has not been applied yet; side actions a rule
    /// needs applied first go through `RuleContext::emit`.
    fn execute(&mut self, cell: CellId, ctx: &mut RuleContext) -> Result<Option<Action>>;

    fn as_movement(&self) -> Option<&dyn MovementRule> {
        None
    }
}

/// Everything a rule may read or change while it runs
pub struct RuleContext<'a> {
    pub controller: &'a mut StateController,
    pub sim: &'a mut SimulationContext,
    pub stats: &'a mut dyn StatisticsSink,
    pub time: Time,
    emitted: Vec<Action>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        controller: &'a mut StateController,
        sim: &'a mut SimulationContext,
        stats: &'a mut dyn StatisticsSink,
        time: Time,
    ) -> Self {
        Self {
            controller,
            sim,
            stats,
            time,
            emitted: Vec::new(),
        }
    }

    pub fn agent_at(&self, cell: CellId) -> Option<AgentId> {
        self.controller.agent_at(cell)
    }

    /// Occupant of `cell` and a copy of its properties
    pub fn occupant(&self, cell: CellId) -> Option<(AgentId, AgentProperties)> {
        let agent = self.agent_at(cell)?;
        let props = self.controller.agents().properties(agent).ok()?;
        Some((agent, props.clone()))
    }

    pub(crate) fn occupant_or_err(&self, cell: CellId) -> Result<(AgentId, AgentProperties)> {
        self.occupant(cell).ok_or(EvacError::EmptyCell(cell))
    }

    /// Apply an action right away and keep it for the log
    pub fn emit(&mut self, action: Action) -> Result<()> {
        apply(&action, self.controller)?;
        self.emitted.push(action);
        Ok(())
    }

    /// Actions applied so far, in order
    pub fn take_emitted(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.emitted)
    }
}

/// Turn the individual towards the steepest descent of `potential`
pub(crate) fn face_descent(ctx: &mut RuleContext, agent: AgentId, cell: CellId, potential: PotentialId) -> Result<()> {
    let grid = ctx.controller.grid();
    let field = ctx.controller.potentials().get(potential)?;
    let Ok(current) = field.potential(cell) else {
        return Ok(());
    };

    let best = grid
        .neighbors(cell)
        .into_iter()
        .filter_map(|(dir, n)| field.potential(n).ok().map(|v| (v, dir)))
        .filter(|&(v, _)| v < current)
        .min_by_key(|&(v, dir)| (v, dir.index()));

    if let Some((_, dir)) = best {
        ctx.controller.set_direction(agent, dir)?;
    }
    Ok(())
}

/// Ordered collection of rules with at most one movement rule
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for a configuration: initial potential and speed as primary
    /// rules, then reaction, panic, potential change, teleport, movement,
    /// save and evacuation in that order
    pub fn standard(config: &SimulationConfig) -> Self {
        let mut rules: Vec<Box<dyn Rule>> = Vec::new();

        match config.initial_potential {
            InitialPotentialPolicy::ShortestPath => rules.push(Box::new(InitialPotentialShortestPathRule)),
            InitialPotentialPolicy::Attractivity => rules.push(Box::new(InitialPotentialAttractivityRule)),
        }
        rules.push(Box::new(InitialSpeedRule));

        rules.push(Box::new(ReactionRule));
        rules.push(Box::new(PanicRule));
        rules.push(Box::new(ChangePotentialRule));
        rules.push(Box::new(TeleportRule));
        match config.movement {
            MovementPolicy::Deterministic => rules.push(Box::new(SimpleMovementRule::new())),
            MovementPolicy::BestResponse => rules.push(Box::new(BestResponseMovementRule::new())),
        }
        rules.push(Box::new(SaveRule));
        rules.push(Box::new(EvacuateRule));

        Self { rules }
    }

    pub fn add(&mut self, rule: Box<dyn Rule>) -> Result<()> {
        if rule.is_movement() {
            if let Some(existing) = self.rules.iter().find(|r| r.is_movement()) {
                return Err(EvacError::DuplicateMovementRule {
                    existing: existing.name(),
                    added: rule.name(),
                });
            }
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn with(mut self, rule: Box<dyn Rule>) -> Result<Self> {
        self.add(rule)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn movement_rule(&self) -> Option<&dyn MovementRule> {
        self.rules.iter().find_map(|r| r.as_movement())
    }

    pub fn primary_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().filter(|r| r.phase().is_primary()).map(|r| r.as_ref())
    }

    pub fn loop_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().filter(|r| r.phase().is_loop()).map(|r| r.as_ref())
    }

    pub(crate) fn primary_rules_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Rule>> {
        self.rules.iter_mut().filter(|r| r.phase().is_primary())
    }

    pub(crate) fn loop_rules_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Rule>> {
        self.rules.iter_mut().filter(|r| r.phase().is_loop())
    }
}

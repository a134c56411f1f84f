//! Simulation engine
//!
//! Drives the rule set over the population: primary rules once, then loop
//! rules every step, followed by the dynamic potential update. Every
//! action is applied through the state controller and recorded.

use serde::Serialize;

use crate::actions::{apply, Action, ActionLog, InitialConfiguration, Replayer};
use crate::agent::{AgentPropertySnapshot, DeathCause, Individual, Lifecycle};
use crate::core::config::SimulationConfig;
use crate::core::error::{EvacError, Result};
use crate::core::types::{AgentId, CellId, Step, Time};
use crate::grid::map::Grid;
use crate::params::ParameterProvider;
use crate::potential::PotentialManager;
use crate::rules::{Rule, RuleContext, RuleSet};
use crate::simulation::context::SimulationContext;
use crate::state::StateController;
use crate::stats::{NullStatistics, StatisticsSink};

/// Lifecycle of a run; `Terminated` is final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationPhase {
    Uninitialized,
    Initializing,
    Stepping,
    Terminated,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: Step,
    pub actions: Vec<Action>,
    /// Individuals still inside after the step, safe ones included
    pub agents_remaining: usize,
    pub time_advanced: Time,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub steps: Step,
    pub individuals: usize,
    pub evacuated: usize,
    /// Safe, including evacuated
    pub safe: usize,
    pub died_exit_unreachable: usize,
    pub died_not_enough_time: usize,
    pub last_evacuation: Option<Time>,
    pub actions: usize,
}

pub struct Simulation<S: StatisticsSink = NullStatistics> {
    controller: StateController,
    context: SimulationContext,
    rules: RuleSet,
    stats: S,
    log: ActionLog,
    initial: InitialConfiguration,
    phase: SimulationPhase,
    step: Step,
}

impl Simulation<NullStatistics> {
    /// Compute the static fields of `grid` and set up the standard rules
    pub fn new(grid: Grid, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let potentials = PotentialManager::from_grid(&grid)?;
        for potential in potentials.statics() {
            if potential.len() < grid.len() {
                tracing::debug!("{} misses {} cells", potential.id, grid.len() - potential.len());
            }
        }

        let initial = InitialConfiguration {
            grid: grid.clone(),
            placements: Vec::new(),
            potentials: potentials.clone(),
        };

        Ok(Self {
            controller: StateController::new(grid, potentials),
            rules: RuleSet::standard(&config),
            context: SimulationContext::new(config),
            stats: NullStatistics,
            log: ActionLog::new(),
            initial,
            phase: SimulationPhase::Uninitialized,
            step: 0,
        })
    }
}

impl<S: StatisticsSink> Simulation<S> {
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_parameters(mut self, params: Box<dyn ParameterProvider>) -> Self {
        self.context.set_parameters(params);
        self
    }

    pub fn with_statistics<T: StatisticsSink>(self, stats: T) -> Simulation<T> {
        Simulation {
            controller: self.controller,
            context: self.context,
            rules: self.rules,
            stats,
            log: self.log,
            initial: self.initial,
            phase: self.phase,
            step: self.step,
        }
    }

    /// Place an individual; only possible before the first step
    pub fn add_individual(&mut self, individual: Individual, cell: CellId) -> Result<()> {
        if self.phase != SimulationPhase::Uninitialized {
            return Err(EvacError::InvalidConfig(format!(
                "{} added after the run started",
                individual.id
            )));
        }
        self.controller.add_agent(individual.clone(), cell)?;
        self.initial.placements.push((individual, cell));
        Ok(())
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// Number of completed steps
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn time(&self) -> Time {
        self.controller.time()
    }

    pub fn controller(&self) -> &StateController {
        &self.controller
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.context.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn statistics(&self) -> &S {
        &self.stats
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn initial_configuration(&self) -> &InitialConfiguration {
        &self.initial
    }

    /// Replay of everything recorded so far
    pub fn replayer(&self) -> Result<Replayer> {
        Replayer::new(self.initial.clone(), self.log.clone())
    }

    pub fn agent_property(&self, id: AgentId) -> Result<AgentPropertySnapshot> {
        self.controller.agents().snapshot(id)
    }

    /// No individual is left that is alive and not yet safe
    pub fn is_finished(&self) -> bool {
        match self.phase {
            SimulationPhase::Terminated => true,
            SimulationPhase::Uninitialized => false,
            _ => self.controller.agents().not_safe_remaining().next().is_none(),
        }
    }

    fn ordered_remaining(&mut self) -> Vec<AgentId> {
        let agents: Vec<AgentId> = self.controller.agents().remaining().iter().copied().collect();
        let order = self.context.config.agent_order;
        order.arrange(&agents, &self.controller, self.context.rng())
    }

    /// Run the primary rules; called by the first `run_step` if needed
    pub fn initialize(&mut self) -> Result<()> {
        match self.phase {
            SimulationPhase::Uninitialized => {}
            SimulationPhase::Terminated => return Err(EvacError::SimulationTerminated),
            _ => return Ok(()),
        }
        self.phase = SimulationPhase::Initializing;
        tracing::info!(
            "Initializing {} individuals with {} rules",
            self.controller.agents().len(),
            self.rules.len()
        );

        for agent in self.ordered_remaining() {
            let mut ctx = RuleContext::new(&mut self.controller, &mut self.context, &mut self.stats, 0.0);
            run_chain(self.rules.primary_rules_mut(), agent, &mut ctx)?;
            for action in ctx.take_emitted() {
                self.log.record(action);
            }
        }

        self.phase = SimulationPhase::Stepping;
        if self.is_finished() {
            self.terminate();
        }
        Ok(())
    }

    /// Advance the run by one step
    pub fn run_step(&mut self) -> Result<StepResult> {
        if self.phase == SimulationPhase::Uninitialized {
            self.initialize()?;
        }
        if self.phase == SimulationPhase::Terminated {
            return Err(EvacError::SimulationTerminated);
        }

        let step = self.step;
        let time = step as Time;
        self.controller.set_time(time);
        self.log.begin_step();

        let mut actions = Vec::new();
        for agent in self.ordered_remaining() {
            if !self.controller.agents().remaining().contains(&agent) {
                continue;
            }
            let mut ctx = RuleContext::new(&mut self.controller, &mut self.context, &mut self.stats, time);
            run_chain(self.rules.loop_rules_mut(), agent, &mut ctx)?;
            actions.extend(ctx.take_emitted());
        }

        if self.context.config.use_dynamic_potential {
            let p_inc = probability("dynamic_increase_probability", self.context.params().dynamic_increase_probability())?;
            let p_dec = probability("dynamic_decrease_probability", self.context.params().dynamic_decrease_probability())?;
            let deltas = self.controller.update_dynamic_potential(p_inc, p_dec, self.context.rng());
            actions.extend(
                deltas
                    .into_iter()
                    .map(|(cell, delta)| Action::DynamicPotentialChange { cell, delta }),
            );
        }

        if step + 1 >= self.context.config.max_steps {
            let stranded: Vec<AgentId> = self.controller.agents().not_safe_remaining().collect();
            if !stranded.is_empty() {
                tracing::warn!("{} individuals still inside after {} steps", stranded.len(), step + 1);
            }
            for agent in stranded {
                let action = Action::Die {
                    agent,
                    cause: DeathCause::NotEnoughTime,
                };
                apply(&action, &mut self.controller)?;
                actions.push(action);
            }
        }

        for action in &actions {
            self.log.record(action.clone());
        }
        if cfg!(debug_assertions) {
            self.controller.check_invariants()?;
        }

        self.step += 1;
        if self.is_finished() || self.step >= self.context.config.max_steps {
            self.terminate();
        }

        Ok(StepResult {
            step,
            actions,
            agents_remaining: self.controller.agents().remaining().len(),
            time_advanced: 1.0,
        })
    }

    /// Step until nobody is left in danger or the step limit is reached
    pub fn run(&mut self) -> Result<RunSummary> {
        self.initialize()?;
        while !self.is_finished() {
            self.run_step()?;
        }
        let summary = self.summary();
        tracing::info!(
            "Run finished after {} steps: {} evacuated, {} safe, {} dead",
            summary.steps,
            summary.evacuated,
            summary.safe,
            summary.died_exit_unreachable + summary.died_not_enough_time
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        let agents = self.controller.agents();
        let mut summary = RunSummary {
            steps: self.step,
            individuals: agents.initial().len(),
            evacuated: agents.evacuated().len(),
            safe: agents.safe().len(),
            died_exit_unreachable: 0,
            died_not_enough_time: 0,
            last_evacuation: None,
            actions: self.log.action_count(),
        };

        for props in agents.initial().iter().filter_map(|&id| agents.properties(id).ok()) {
            match props.lifecycle {
                Lifecycle::Dead(DeathCause::ExitUnreachable) => summary.died_exit_unreachable += 1,
                Lifecycle::Dead(DeathCause::NotEnoughTime) => summary.died_not_enough_time += 1,
                Lifecycle::Evacuated(time) => {
                    summary.last_evacuation = Some(summary.last_evacuation.map_or(time, |t: Time| t.max(time)));
                }
                Lifecycle::Alive => {}
            }
        }
        summary
    }

    fn terminate(&mut self) {
        self.phase = SimulationPhase::Terminated;
        tracing::info!("Simulation terminated at step {}", self.step);
    }
}

/// Reject a provider probability outside [0, 1]
fn probability(name: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EvacError::InvalidConfig(format!("{} ({}) must be in [0, 1]", name, value)))
    }
}

/// Run one individual through a sequence of rules
///
/// The individual's cell is looked up again before every rule, so a rule
/// sees the effect of the ones before it.
fn run_chain<'r>(
    rules: impl Iterator<Item = &'r mut Box<dyn Rule>>,
    agent: AgentId,
    ctx: &mut RuleContext,
) -> Result<()> {
    for rule in rules {
        let Some(cell) = ctx.controller.agents().properties(agent)?.cell else {
            break;
        };
        if !rule.executable_on(cell, ctx) {
            continue;
        }
        if let Some(action) = rule.execute(cell, ctx)? {
            tracing::trace!("{} on {}: {}", rule.name(), cell, action.name());
            ctx.emit(action)?;
        }
    }
    Ok(())
}

//! Action log and replay
//!
//! The log groups actions by step, in the order they were applied.
//! Together with the `InitialConfiguration` it is enough to rebuild every
//! position of a run without evaluating a single rule.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actions::action::{apply, Action};
use crate::agent::Individual;
use crate::core::error::{EvacError, Result};
use crate::core::types::{AgentId, CellId, Step};
use crate::grid::map::Grid;
use crate::potential::PotentialManager;
use crate::state::StateController;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionLog {
    /// Actions of the primary rules, before the first step
    initialization: Vec<Action>,
    steps: Vec<Vec<Action>>,
    #[serde(skip)]
    cursor: usize,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new step; later records go there
    pub fn begin_step(&mut self) -> Step {
        self.steps.push(Vec::new());
        (self.steps.len() - 1) as Step
    }

    /// Append to the open step, or to the initialization block before the
    /// first `begin_step`
    pub fn record(&mut self, action: Action) {
        match self.steps.last_mut() {
            Some(step) => step.push(action),
            None => self.initialization.push(action),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn initialization(&self) -> &[Action] {
        &self.initialization
    }

    pub fn step(&self, index: Step) -> Result<&[Action]> {
        self.steps
            .get(index as usize)
            .map(|s| s.as_slice())
            .ok_or(EvacError::StepOutOfRange {
                step: index,
                len: self.steps.len(),
            })
    }

    pub fn steps(&self) -> impl Iterator<Item = &[Action]> {
        self.steps.iter().map(|s| s.as_slice())
    }

    pub fn action_count(&self) -> usize {
        self.initialization.len() + self.steps.iter().map(Vec::len).sum::<usize>()
    }

    /// Index of the step `next` would return
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// The cursor sits between steps; `next` returns the step after it and
    /// moves past it
    pub fn next(&mut self) -> Option<&[Action]> {
        let step = self.steps.get(self.cursor)?;
        self.cursor += 1;
        Some(step.as_slice())
    }

    /// Step before the cursor, moving the cursor in front of it
    ///
    /// Right after `next` this is the step `next` just returned.
    pub fn previous(&mut self) -> Option<&[Action]> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.steps.get(self.cursor).map(|s| s.as_slice())
    }

    /// Return step `index` and place the cursor right after it
    pub fn jump_to(&mut self, index: Step) -> Result<&[Action]> {
        let len = self.steps.len();
        if index as usize >= len {
            return Err(EvacError::StepOutOfRange { step: index, len });
        }
        self.cursor = index as usize + 1;
        Ok(self.steps[index as usize].as_slice())
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }
}

/// Building, population and fields as they were before the first rule ran
#[derive(Debug, Clone)]
pub struct InitialConfiguration {
    pub grid: Grid,
    pub placements: Vec<(Individual, CellId)>,
    pub potentials: PotentialManager,
}

impl InitialConfiguration {
    /// A fresh controller in the recorded start state
    pub fn build(&self) -> Result<StateController> {
        let mut controller = StateController::new(self.grid.clone(), self.potentials.clone());
        for (individual, cell) in &self.placements {
            controller.add_agent(individual.clone(), *cell)?;
        }
        Ok(controller)
    }
}

/// Re-executes a recorded run step by step
pub struct Replayer {
    initial: InitialConfiguration,
    log: ActionLog,
    controller: StateController,
    /// Number of steps applied so far
    applied: usize,
}

impl Replayer {
    pub fn new(initial: InitialConfiguration, log: ActionLog) -> Result<Self> {
        let controller = Self::rebuild(&initial, &log)?;
        Ok(Self {
            initial,
            log,
            controller,
            applied: 0,
        })
    }

    fn rebuild(initial: &InitialConfiguration, log: &ActionLog) -> Result<StateController> {
        let mut controller = initial.build()?;
        for action in log.initialization() {
            apply(action, &mut controller)?;
        }
        Ok(controller)
    }

    pub fn controller(&self) -> &StateController {
        &self.controller
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn position(&self) -> usize {
        self.applied
    }

    /// Apply the next step; false once the log is exhausted
    pub fn forward(&mut self) -> Result<bool> {
        if self.applied >= self.log.len() {
            return Ok(false);
        }
        self.controller.set_time(self.applied as f64);
        for action in self.log.step(self.applied as Step)? {
            apply(action, &mut self.controller)?;
        }
        self.applied += 1;
        Ok(true)
    }

    /// Undo the last step by replaying everything before it
    pub fn backward(&mut self) -> Result<bool> {
        if self.applied == 0 {
            return Ok(false);
        }
        self.seek(self.applied - 1)?;
        Ok(true)
    }

    /// Move to the state after `steps` steps
    pub fn seek(&mut self, steps: usize) -> Result<()> {
        if steps > self.log.len() {
            return Err(EvacError::StepOutOfRange {
                step: steps as Step,
                len: self.log.len(),
            });
        }
        if steps < self.applied {
            self.controller = Self::rebuild(&self.initial, &self.log)?;
            self.applied = 0;
        }
        while self.applied < steps {
            self.forward()?;
        }
        Ok(())
    }

    /// Cell of every initial individual; `None` once dead or evacuated
    pub fn positions(&self) -> BTreeMap<AgentId, Option<CellId>> {
        let agents = self.controller.agents();
        agents
            .initial()
            .iter()
            .map(|&id| (id, agents.properties(id).ok().and_then(|p| p.cell)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::direction::Direction8;
    use crate::grid::parse_layout;

    fn move_action(from: CellId, to: CellId, start: f64) -> Action {
        Action::Move {
            agent: AgentId(0),
            from,
            to,
            direction: Direction8::Left,
            start_time: start,
            end_time: start + 1.0,
        }
    }

    fn recorded_walk() -> (InitialConfiguration, ActionLog, Vec<CellId>) {
        let layout = parse_layout("E..").unwrap();
        let cells: Vec<CellId> = (0..3).map(|x| layout.grid.cell_at(0, x, 0).unwrap()).collect();
        let potentials = PotentialManager::from_grid(&layout.grid).unwrap();
        let initial = InitialConfiguration {
            grid: layout.grid,
            placements: vec![(Individual::new(AgentId(0)), cells[2])],
            potentials,
        };

        let mut log = ActionLog::new();
        log.record(Action::ChangePotential {
            agent: AgentId(0),
            potential: crate::core::types::PotentialId(0),
        });
        log.begin_step();
        log.record(move_action(cells[2], cells[1], 0.0));
        log.begin_step();
        log.record(move_action(cells[1], cells[0], 1.0));
        log.record(Action::Evacuate {
            agent: AgentId(0),
            time: 2.0,
        });
        (initial, log, cells)
    }

    #[test]
    fn test_cursor_navigation() {
        let (_, mut log, _) = recorded_walk();
        assert_eq!(log.len(), 2);
        assert_eq!(log.initialization().len(), 1);
        assert_eq!(log.action_count(), 4);

        assert_eq!(log.next().unwrap().len(), 1);
        assert_eq!(log.next().unwrap().len(), 2);
        assert!(log.next().is_none());
        assert_eq!(log.previous().unwrap().len(), 2);

        // previous after next hands back the same step
        log.reset_cursor();
        let first = log.next().unwrap().to_vec();
        assert_eq!(log.previous().unwrap(), first.as_slice());
        assert_eq!(log.position(), 0);
        assert!(log.previous().is_none());

        assert_eq!(log.jump_to(0).unwrap().len(), 1);
        assert_eq!(log.position(), 1);
        assert!(matches!(
            log.jump_to(2),
            Err(EvacError::StepOutOfRange { step: 2, len: 2 })
        ));
    }

    #[test]
    fn test_replay_forward_and_back() {
        let (initial, log, cells) = recorded_walk();
        let mut replayer = Replayer::new(initial, log).unwrap();
        assert_eq!(replayer.positions()[&AgentId(0)], Some(cells[2]));

        assert!(replayer.forward().unwrap());
        assert_eq!(replayer.positions()[&AgentId(0)], Some(cells[1]));

        assert!(replayer.forward().unwrap());
        assert_eq!(replayer.positions()[&AgentId(0)], None);
        assert!(replayer.controller().agents().evacuated().contains(&AgentId(0)));
        assert!(!replayer.forward().unwrap());

        assert!(replayer.backward().unwrap());
        assert_eq!(replayer.position(), 1);
        assert_eq!(replayer.positions()[&AgentId(0)], Some(cells[1]));
        assert!(replayer.controller().check_invariants().is_ok());
    }

    #[test]
    fn test_seek_out_of_range() {
        let (initial, log, _) = recorded_walk();
        let mut replayer = Replayer::new(initial, log).unwrap();
        assert!(replayer.seek(3).is_err());
        replayer.seek(2).unwrap();
        replayer.seek(0).unwrap();
        assert_eq!(replayer.position(), 0);
    }

    #[test]
    fn test_log_serializes() {
        let (_, log, _) = recorded_walk();
        let json = serde_json::to_string(&log).unwrap();
        let back: ActionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.step(1).unwrap(), log.step(1).unwrap());
    }
}

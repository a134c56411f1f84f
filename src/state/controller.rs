//! State controller - the only writer of occupancy and lifecycle
//!
//! Rules and the replayer describe changes as actions; applying an action
//! always ends up in one of the methods below, so live runs and replays
//! share a single set of checks.

use rand::Rng;

use crate::agent::{AgentStore, DeathCause, Individual};
use crate::core::error::{EvacError, Result};
use crate::core::types::{AgentId, CellId, PotentialId, RoomId, Time};
use crate::grid::direction::Direction8;
use crate::grid::map::Grid;
use crate::potential::PotentialManager;
use crate::state::EvacuationState;

#[derive(Debug, Clone)]
pub struct StateController {
    state: EvacuationState,
}

impl StateController {
    pub fn new(grid: Grid, potentials: PotentialManager) -> Self {
        Self {
            state: EvacuationState {
                grid,
                agents: AgentStore::new(),
                potentials,
                time: 0.0,
            },
        }
    }

    pub fn state(&self) -> &EvacuationState {
        &self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    pub fn agents(&self) -> &AgentStore {
        &self.state.agents
    }

    pub fn potentials(&self) -> &PotentialManager {
        &self.state.potentials
    }

    pub fn time(&self) -> Time {
        self.state.time
    }

    pub(crate) fn set_time(&mut self, time: Time) {
        self.state.time = time;
    }

    pub fn agent_at(&self, cell: CellId) -> Option<AgentId> {
        self.state.grid.cell(cell).ok().and_then(|c| c.occupant())
    }

    fn occupant(&self, cell: CellId) -> Result<AgentId> {
        self.state.grid.cell(cell)?.occupant().ok_or(EvacError::EmptyCell(cell))
    }

    fn room_of(&self, cell: CellId) -> Result<RoomId> {
        Ok(self.state.grid.cell(cell)?.room)
    }

    /// Place a new individual; only used while setting up a run
    pub fn add_agent(&mut self, individual: Individual, cell: CellId) -> Result<()> {
        if let Some(occupant) = self.state.grid.cell(cell)?.occupant() {
            return Err(EvacError::CellOccupied { cell, occupant });
        }
        let id = individual.id;
        self.state.agents.add(individual, cell)?;
        self.occupy(cell, id)
    }

    fn occupy(&mut self, cell: CellId, agent: AgentId) -> Result<()> {
        let room = self.room_of(cell)?;
        self.state.grid.cell_mut(cell)?.set_occupant(Some(agent));
        self.state.grid.room_mut(room)?.add_agent(agent);
        self.state.agents.properties_mut(agent)?.cell = Some(cell);
        Ok(())
    }

    fn vacate(&mut self, cell: CellId) -> Result<AgentId> {
        let agent = self.occupant(cell)?;
        let room = self.room_of(cell)?;
        self.state.grid.cell_mut(cell)?.set_occupant(None);
        self.state.grid.room_mut(room)?.remove_agent(agent);
        Ok(agent)
    }

    fn cell_of(&self, agent: AgentId) -> Result<CellId> {
        self.state
            .agents
            .properties(agent)?
            .cell
            .ok_or(EvacError::AgentNotInSet {
                agent,
                set: "remaining",
            })
    }

    /// Move the occupant of `from` to `to`
    pub fn move_agent(&mut self, from: CellId, to: CellId) -> Result<()> {
        let agent = self.occupant(from)?;
        if from == to {
            return Ok(());
        }
        if let Some(occupant) = self.state.grid.cell(to)?.occupant() {
            return Err(EvacError::CellOccupied { cell: to, occupant });
        }
        self.vacate(from)?;
        self.occupy(to, agent)
    }

    /// Exchange the occupants of two cells
    pub fn swap(&mut self, a: CellId, b: CellId) -> Result<()> {
        let first = self.occupant(a)?;
        let second = self.occupant(b)?;
        if a == b {
            return Ok(());
        }
        let room_a = self.room_of(a)?;
        let room_b = self.room_of(b)?;
        if room_a != room_b {
            self.state.grid.room_mut(room_a)?.remove_agent(first);
            self.state.grid.room_mut(room_b)?.remove_agent(second);
        }
        self.occupy(a, second)?;
        self.occupy(b, first)
    }

    pub fn die(&mut self, agent: AgentId, cause: DeathCause) -> Result<()> {
        let cell = self.state.agents.properties(agent)?.cell;
        self.state.agents.mark_dead(agent, cause)?;
        if let Some(cell) = cell {
            self.vacate(cell)?;
        }
        tracing::debug!("{} died: {:?}", agent, cause);
        Ok(())
    }

    pub fn set_safe(&mut self, agent: AgentId, time: Time) -> Result<()> {
        self.state.agents.mark_safe(agent, time)
    }

    /// Leave the building; implies safe
    pub fn evacuate(&mut self, agent: AgentId, time: Time) -> Result<()> {
        let cell = self.cell_of(agent)?;
        self.state.agents.mark_evacuated(agent, time)?;
        self.vacate(cell)?;
        tracing::debug!("{} evacuated at {:.2}", agent, time);
        Ok(())
    }

    pub fn set_static_potential(&mut self, agent: AgentId, potential: PotentialId) -> Result<()> {
        self.state.potentials.get(potential)?;
        self.state.agents.properties_mut(agent)?.static_potential = Some(potential);
        Ok(())
    }

    pub fn set_step_times(&mut self, agent: AgentId, start: Time, end: Time) -> Result<()> {
        let props = self.state.agents.properties_mut(agent)?;
        props.step_start_time = start;
        props.step_end_time = end;
        Ok(())
    }

    pub fn set_direction(&mut self, agent: AgentId, direction: Direction8) -> Result<()> {
        self.state.agents.properties_mut(agent)?.direction = direction;
        Ok(())
    }

    pub fn set_occupied_until(&mut self, cell: CellId, time: Time) -> Result<()> {
        self.state.grid.cell_mut(cell)?.set_occupied_until(time);
        Ok(())
    }

    pub fn alarm(&mut self, agent: AgentId) -> Result<()> {
        self.state.agents.properties_mut(agent)?.alarmed = true;
        Ok(())
    }

    pub fn alarm_room(&mut self, room: RoomId) -> Result<()> {
        self.state.grid.room_mut(room)?.set_alarmed(true);
        Ok(())
    }

    pub fn set_panic(&mut self, agent: AgentId, panic: f64) -> Result<()> {
        self.state.agents.properties_mut(agent)?.panic = panic.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_exhaustion(&mut self, agent: AgentId, exhaustion: f64) -> Result<()> {
        self.state.agents.properties_mut(agent)?.exhaustion = exhaustion.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_relative_speed(&mut self, agent: AgentId, speed: f64) -> Result<()> {
        self.state.agents.properties_mut(agent)?.relative_speed = speed.clamp(f64::EPSILON, 1.0);
        Ok(())
    }

    pub fn set_teleport_failed(&mut self, agent: AgentId, failed: bool) -> Result<()> {
        self.state.agents.properties_mut(agent)?.teleport_failed = failed;
        Ok(())
    }

    /// Positive deltas count as crossings for this step's update
    pub fn change_dynamic_potential(&mut self, cell: CellId, delta: i32) -> Result<()> {
        self.state.grid.cell(cell)?;
        let dynamic = self.state.potentials.dynamic_mut();
        if delta > 0 {
            for _ in 0..delta {
                dynamic.increase(cell);
            }
        } else {
            dynamic.apply_delta(cell, delta);
        }
        Ok(())
    }

    pub fn update_dynamic_potential<R: Rng>(&mut self, p_inc: f64, p_dec: f64, rng: &mut R) -> Vec<(CellId, i32)> {
        self.state.potentials.dynamic_mut().update(p_inc, p_dec, rng)
    }

    /// Verify occupancy against property records and lifecycle sets
    pub fn check_invariants(&self) -> Result<()> {
        let agents = &self.state.agents;

        for cell in self.state.grid.cells() {
            let Some(agent) = cell.occupant() else {
                continue;
            };
            if agents.properties(agent)?.cell != Some(cell.id) {
                return Err(EvacError::InvariantViolation(format!(
                    "{} holds {} but the agent is elsewhere",
                    cell.id, agent
                )));
            }
            if !agents.remaining().contains(&agent) {
                return Err(EvacError::InvariantViolation(format!(
                    "{} holds {} which is no longer remaining",
                    cell.id, agent
                )));
            }
            if !self.state.grid.room(cell.room)?.agents().contains(&agent) {
                return Err(EvacError::InvariantViolation(format!(
                    "{} missing from {}",
                    agent, cell.room
                )));
            }
        }

        for &agent in agents.remaining() {
            let cell = self.cell_of(agent)?;
            if self.state.grid.cell(cell)?.occupant() != Some(agent) {
                return Err(EvacError::InvariantViolation(format!(
                    "{} claims {} which it does not occupy",
                    agent, cell
                )));
            }
        }

        agents.check_lifecycle()
    }
}

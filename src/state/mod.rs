//! Simulation state and its single writer

pub mod controller;

use crate::agent::AgentStore;
use crate::core::types::Time;
use crate::grid::map::Grid;
use crate::potential::PotentialManager;

pub use controller::StateController;

/// Everything that changes while a run progresses
#[derive(Debug, Clone)]
pub struct EvacuationState {
    pub(crate) grid: Grid,
    pub(crate) agents: AgentStore,
    pub(crate) potentials: PotentialManager,
    pub(crate) time: Time,
}

impl EvacuationState {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn potentials(&self) -> &PotentialManager {
        &self.potentials
    }

    /// Simulated time in steps
    pub fn time(&self) -> Time {
        self.time
    }
}

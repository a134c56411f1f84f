//! Mutable per-individual state

use serde::{Deserialize, Serialize};

use crate::agent::individual::Individual;
use crate::core::types::{AgentId, CellId, PotentialId, Time};
use crate::grid::direction::Direction8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// No exit can be reached from the start cell
    ExitUnreachable,
    /// Still inside when the step limit was reached
    NotEnoughTime,
}

/// Terminal state; being safe is tracked separately
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    Alive,
    Dead(DeathCause),
    Evacuated(Time),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProperties {
    /// `None` once the individual left the building or died
    pub cell: Option<CellId>,
    pub static_potential: Option<PotentialId>,
    pub relative_speed: f64,
    pub panic: f64,
    pub exhaustion: f64,
    pub direction: Direction8,
    pub alarmed: bool,
    pub step_start_time: Time,
    pub step_end_time: Time,
    pub lifecycle: Lifecycle,
    pub death_cause: Option<DeathCause>,
    pub safe_time: Option<Time>,
    pub teleport_failed: bool,
}

impl AgentProperties {
    pub fn new(individual: &Individual, cell: CellId) -> Self {
        Self {
            cell: Some(cell),
            static_potential: None,
            relative_speed: individual.max_relative_speed,
            panic: 0.0,
            exhaustion: 0.0,
            direction: Direction8::Top,
            alarmed: false,
            step_start_time: 0.0,
            step_end_time: 0.0,
            lifecycle: Lifecycle::Alive,
            death_cause: None,
            safe_time: None,
            teleport_failed: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    pub fn is_safe(&self) -> bool {
        self.safe_time.is_some()
    }

    /// Whether the current movement has finished at `time`
    pub fn is_ready(&self, time: Time) -> bool {
        self.step_end_time <= time
    }
}

/// Read-only copy handed out by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPropertySnapshot {
    pub id: AgentId,
    pub individual: Individual,
    pub properties: AgentProperties,
}

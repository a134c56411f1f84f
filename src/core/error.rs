use thiserror::Error;

use crate::core::types::{AgentId, CellId, PotentialId, Step};

#[derive(Error, Debug)]
pub enum EvacError {
    // === CONFIGURATION ===
    #[error("Rule set already has a movement rule ({existing}); cannot add {added}")]
    DuplicateMovementRule {
        existing: &'static str,
        added: &'static str,
    },

    #[error("Malformed exit cluster: {cell} was already seeded")]
    MalformedExit { cell: CellId },

    #[error("Speed factor {value} of {cell} is outside (0, 1]")]
    SpeedFactorOutOfRange { cell: CellId, value: f64 },

    #[error("Stair speed factor {value} of {cell} is outside (0, 1]")]
    StairFactorOutOfRange { cell: CellId, value: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === INVARIANT VIOLATIONS ===
    #[error("{agent} is not in the {set} set")]
    AgentNotInSet { agent: AgentId, set: &'static str },

    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("Unknown cell: {0}")]
    UnknownCell(CellId),

    #[error("{0} has no agent")]
    EmptyCell(CellId),

    #[error("{cell} is already occupied by {occupant}")]
    CellOccupied { cell: CellId, occupant: AgentId },

    #[error("Invalid potential: {cell} has no value in {potential}")]
    InvalidPotential { cell: CellId, potential: PotentialId },

    #[error("Potential of {cell} in {potential} was already set")]
    PotentialAlreadySet { cell: CellId, potential: PotentialId },

    #[error("Unknown potential: {0}")]
    UnknownPotential(PotentialId),

    #[error("Death cause of {0} was already set")]
    DeathCauseAlreadySet(AgentId),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Step {step} is out of range (log has {len} steps)")]
    StepOutOfRange { step: Step, len: usize },

    #[error("Simulation already terminated")]
    SimulationTerminated,

    // === EXTERNAL ===
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Layout error: {0}")]
    LayoutError(String),
}

impl EvacError {
    /// Errors detected while setting up a run, before the first step
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EvacError::DuplicateMovementRule { .. }
                | EvacError::MalformedExit { .. }
                | EvacError::SpeedFactorOutOfRange { .. }
                | EvacError::StairFactorOutOfRange { .. }
                | EvacError::InvalidConfig(_)
                | EvacError::TomlError(_)
                | EvacError::LayoutError(_)
        )
    }

    /// Errors that indicate a bug in the caller or the engine
    pub fn is_invariant(&self) -> bool {
        matches!(
            self,
            EvacError::AgentNotInSet { .. }
                | EvacError::UnknownAgent(_)
                | EvacError::UnknownCell(_)
                | EvacError::EmptyCell(_)
                | EvacError::CellOccupied { .. }
                | EvacError::InvalidPotential { .. }
                | EvacError::PotentialAlreadySet { .. }
                | EvacError::UnknownPotential(_)
                | EvacError::DeathCauseAlreadySet(_)
                | EvacError::InvariantViolation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EvacError>;

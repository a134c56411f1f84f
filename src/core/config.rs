//! Simulation configuration with documented constants
//!
//! Everything a run needs besides the building and the population lives
//! here. Values can be loaded from TOML; missing keys fall back to the
//! defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EvacError, Result};
use crate::params::DefaultParameters;
use crate::simulation::order::AgentOrder;

/// Which movement rule drives the individuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Always take the free neighbour with the lowest potential
    Deterministic,
    /// Draw a neighbour with probability proportional to exp(potential gain)
    #[default]
    BestResponse,
}

/// How individuals are bound to an exit during initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPotentialPolicy {
    /// Nearest exit by static potential
    #[default]
    ShortestPath,
    /// Exit scored by attractivity over distance, weighted by familiarity
    Attractivity,
}

/// Configuration for one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed of the run's random source
    ///
    /// Two runs with the same seed, building and population produce the
    /// same action log.
    pub seed: u64,

    /// Hard step limit
    ///
    /// Individuals still inside when the limit is reached die with
    /// `NotEnoughTime`.
    pub max_steps: u64,

    /// Order in which individuals are processed within a phase
    pub agent_order: AgentOrder,

    /// Movement rule registered by `RuleSet::standard`
    pub movement: MovementPolicy,

    /// Primary rule used to bind individuals to exits
    pub initial_potential: InitialPotentialPolicy,

    /// Distance (in cells) charged for a step that changes room or floor
    ///
    /// Door and teleport transitions are shorter than a full cell crossing.
    pub room_crossing_distance: f64,

    /// Whether crossing cells feeds the dynamic potential
    pub use_dynamic_potential: bool,

    /// Numeric behaviour parameters
    pub parameters: DefaultParameters,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            max_steps: 1_000,
            agent_order: AgentOrder::RandomPermutation,
            movement: MovementPolicy::BestResponse,
            initial_potential: InitialPotentialPolicy::ShortestPath,
            room_crossing_distance: 0.5,
            use_dynamic_potential: true,
            parameters: DefaultParameters::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(EvacError::InvalidConfig("max_steps must be positive".into()));
        }

        if !(self.room_crossing_distance > 0.0 && self.room_crossing_distance <= 2.0) {
            return Err(EvacError::InvalidConfig(format!(
                "room_crossing_distance ({}) must be in (0, 2]",
                self.room_crossing_distance
            )));
        }

        self.parameters.validate()
    }
}

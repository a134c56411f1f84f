//! Behaviour parameters
//!
//! Rules never hard-code how individuals react; they ask a
//! `ParameterProvider`. `DefaultParameters` is the stock provider and is
//! also the `[parameters]` table of the run configuration.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentProperties, Individual};
use crate::core::error::{EvacError, Result};

pub trait ParameterProvider {
    /// Relative speed assigned during initialization, in (0, 1]
    fn initial_speed(&self, individual: &Individual) -> f64;

    /// Cells per step covered at relative speed 1
    fn absolute_max_speed(&self) -> f64;

    /// New panic level; `congestion` is the share of blocked neighbours
    fn update_panic(&self, individual: &Individual, props: &AgentProperties, congestion: f64) -> f64;

    fn update_exhaustion(&self, individual: &Individual, props: &AgentProperties, moving: bool) -> f64;

    /// Relative speed after panic and exhaustion were updated
    fn update_speed(&self, individual: &Individual, props: &AgentProperties) -> f64;

    /// Per-step chance of switching to another exit
    fn change_potential_probability(&self, individual: &Individual, props: &AgentProperties) -> f64;

    fn dynamic_increase_probability(&self) -> f64;

    fn dynamic_decrease_probability(&self) -> f64;

    fn static_potential_weight(&self) -> f64;

    fn dynamic_potential_weight(&self) -> f64;

    /// Steps until the individual reacts without being alarmed by others
    fn reaction_time_steps(&self, individual: &Individual) -> f64;
}

/// Stock behaviour parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultParameters {
    /// Cells per step at full relative speed
    pub absolute_max_speed: f64,

    /// Weight of the static potential gain in Best-Response scores
    pub static_potential_weight: f64,

    /// Weight of the dynamic potential gain in Best-Response scores
    pub dynamic_potential_weight: f64,

    /// Chance that a positive, uncrossed cell grows during an update
    pub dynamic_increase_probability: f64,

    /// Chance that a positive cell decays during an update
    pub dynamic_decrease_probability: f64,

    /// Panic gained per step in a fully blocked neighbourhood
    pub panic_increase: f64,

    /// Panic lost per step with free neighbours
    pub panic_decrease: f64,

    /// Exhaustion gained per step while walking
    pub exhaustion_increase: f64,

    /// Exhaustion lost per step while standing
    pub exhaustion_recovery: f64,

    /// Speed lost at full exhaustion
    pub exhaustion_speed_loss: f64,

    /// Speed gained at full panic
    pub panic_speed_gain: f64,

    /// Speed lost by a fully slack individual
    pub slackness_speed_loss: f64,

    /// Exit switching chance at full panic
    pub change_potential_ratio: f64,

    /// Multiplier applied to an individual's reaction time
    pub reaction_time_scale: f64,

    /// Floor for relative speeds so movement always terminates
    pub minimum_relative_speed: f64,
}

impl Default for DefaultParameters {
    fn default() -> Self {
        Self {
            absolute_max_speed: 1.0,
            static_potential_weight: 3.0,
            dynamic_potential_weight: 1.0,
            dynamic_increase_probability: 0.3,
            dynamic_decrease_probability: 0.2,
            panic_increase: 0.1,
            panic_decrease: 0.05,
            exhaustion_increase: 0.01,
            exhaustion_recovery: 0.02,
            exhaustion_speed_loss: 0.5,
            panic_speed_gain: 0.2,
            slackness_speed_loss: 0.5,
            change_potential_ratio: 0.02,
            reaction_time_scale: 1.0,
            minimum_relative_speed: 0.05,
        }
    }
}

impl DefaultParameters {
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("dynamic_increase_probability", self.dynamic_increase_probability),
            ("dynamic_decrease_probability", self.dynamic_decrease_probability),
            ("change_potential_ratio", self.change_potential_ratio),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvacError::InvalidConfig(format!("{} ({}) must be in [0, 1]", name, value)));
            }
        }

        if self.absolute_max_speed <= 0.0 {
            return Err(EvacError::InvalidConfig(format!(
                "absolute_max_speed ({}) must be positive",
                self.absolute_max_speed
            )));
        }

        if self.static_potential_weight < 0.0 || self.dynamic_potential_weight < 0.0 {
            return Err(EvacError::InvalidConfig("potential weights must not be negative".into()));
        }

        if !(self.minimum_relative_speed > 0.0 && self.minimum_relative_speed <= 1.0) {
            return Err(EvacError::InvalidConfig(format!(
                "minimum_relative_speed ({}) must be in (0, 1]",
                self.minimum_relative_speed
            )));
        }

        Ok(())
    }

    fn clamp_speed(&self, speed: f64) -> f64 {
        speed.clamp(self.minimum_relative_speed, 1.0)
    }
}

impl ParameterProvider for DefaultParameters {
    fn initial_speed(&self, individual: &Individual) -> f64 {
        self.clamp_speed(individual.max_relative_speed * (1.0 - self.slackness_speed_loss * individual.slackness))
    }

    fn absolute_max_speed(&self) -> f64 {
        self.absolute_max_speed
    }

    fn update_panic(&self, individual: &Individual, props: &AgentProperties, congestion: f64) -> f64 {
        let congestion = congestion.clamp(0.0, 1.0);
        let change = self.panic_increase * congestion - self.panic_decrease * (1.0 - congestion);
        (props.panic + individual.panic_factor * change).clamp(0.0, 1.0)
    }

    fn update_exhaustion(&self, individual: &Individual, props: &AgentProperties, moving: bool) -> f64 {
        let change = if moving {
            individual.exhaustion_factor * self.exhaustion_increase
        } else {
            -self.exhaustion_recovery
        };
        (props.exhaustion + change).clamp(0.0, 1.0)
    }

    fn update_speed(&self, individual: &Individual, props: &AgentProperties) -> f64 {
        let base = self.initial_speed(individual);
        let speed = base * (1.0 - self.exhaustion_speed_loss * props.exhaustion) * (1.0 + self.panic_speed_gain * props.panic);
        self.clamp_speed(speed.min(individual.max_relative_speed))
    }

    fn change_potential_probability(&self, _individual: &Individual, props: &AgentProperties) -> f64 {
        (props.panic * self.change_potential_ratio).clamp(0.0, 1.0)
    }

    fn dynamic_increase_probability(&self) -> f64 {
        self.dynamic_increase_probability
    }

    fn dynamic_decrease_probability(&self) -> f64 {
        self.dynamic_decrease_probability
    }

    fn static_potential_weight(&self) -> f64 {
        self.static_potential_weight
    }

    fn dynamic_potential_weight(&self) -> f64 {
        self.dynamic_potential_weight
    }

    fn reaction_time_steps(&self, individual: &Individual) -> f64 {
        individual.reaction_time * self.reaction_time_scale
    }
}

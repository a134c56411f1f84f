//! Individuals and their fixed physical traits

use serde::{Deserialize, Serialize};

use crate::core::types::AgentId;

/// Traits fixed when an individual is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub id: AgentId,
    pub age: u32,
    /// Knowledge of the building (0.0 - 1.0)
    pub familiarity: f64,
    /// Susceptibility to panic (0.0 - 1.0)
    pub panic_factor: f64,
    /// Tendency to dawdle (0.0 - 1.0)
    pub slackness: f64,
    /// How quickly the individual tires (0.0 - 1.0)
    pub exhaustion_factor: f64,
    /// Top speed relative to the fastest possible individual (0.0 - 1.0]
    pub max_relative_speed: f64,
    /// Steps before the individual starts to react on its own
    pub reaction_time: f64,
}

impl Individual {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            age: 30,
            familiarity: 0.5,
            panic_factor: 0.5,
            slackness: 0.0,
            exhaustion_factor: 0.5,
            max_relative_speed: 1.0,
            reaction_time: 0.0,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    pub fn with_familiarity(mut self, familiarity: f64) -> Self {
        self.familiarity = familiarity.clamp(0.0, 1.0);
        self
    }

    pub fn with_panic_factor(mut self, panic_factor: f64) -> Self {
        self.panic_factor = panic_factor.clamp(0.0, 1.0);
        self
    }

    pub fn with_slackness(mut self, slackness: f64) -> Self {
        self.slackness = slackness.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_relative_speed(mut self, speed: f64) -> Self {
        self.max_relative_speed = speed.clamp(f64::EPSILON, 1.0);
        self
    }

    pub fn with_reaction_time(mut self, steps: f64) -> Self {
        self.reaction_time = steps.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_clamp() {
        let individual = Individual::new(AgentId(1))
            .with_familiarity(2.0)
            .with_max_relative_speed(0.0)
            .with_reaction_time(-3.0);
        assert_eq!(individual.familiarity, 1.0);
        assert!(individual.max_relative_speed > 0.0);
        assert_eq!(individual.reaction_time, 0.0);
    }
}

//! Explicit run context handed to every rule

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::params::ParameterProvider;

/// Seeded random source, parameters and configuration of one run
pub struct SimulationContext {
    pub config: SimulationConfig,
    rng: ChaCha8Rng,
    params: Box<dyn ParameterProvider>,
}

impl SimulationContext {
    /// Context using the `[parameters]` table of the configuration
    pub fn new(config: SimulationConfig) -> Self {
        let params = Box::new(config.parameters.clone());
        Self::with_parameters(config, params)
    }

    pub fn with_parameters(config: SimulationConfig, params: Box<dyn ParameterProvider>) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng, params }
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn params(&self) -> &dyn ParameterProvider {
        self.params.as_ref()
    }

    pub fn set_parameters(&mut self, params: Box<dyn ParameterProvider>) {
        self.params = params;
    }

    /// Restart the random source
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = SimulationContext::new(SimulationConfig::default());
        let mut b = SimulationContext::new(SimulationConfig::default());
        let xs: Vec<u32> = (0..8).map(|_| a.rng().gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.rng().gen()).collect();
        assert_eq!(xs, ys);

        b.reseed(99);
        let zs: Vec<u32> = (0..8).map(|_| b.rng().gen()).collect();
        assert_ne!(xs, zs);
    }

    #[test]
    fn test_parameters_from_config() {
        let mut config = SimulationConfig::default();
        config.parameters.absolute_max_speed = 2.0;
        let context = SimulationContext::new(config);
        assert_eq!(context.params().absolute_max_speed(), 2.0);
    }
}

use serde::{Deserialize, Serialize};

/// Configuration data for design generation
/// and evolution.
///
/// # Note
/// `crossover_weight` should be in the range [0.0, 1.0],
/// and `lower_bound` should not exceed `upper_bound`.
/// Optimizers refuse to be constructed otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Smallest value any design variable may take.
    pub lower_bound: f64,
    /// Largest value any design variable may take.
    pub upper_bound: f64,
    /// Weight given to the fitter parent during crossover.
    /// The less fit parent receives `1 - crossover_weight`.
    pub crossover_weight: f64,
    /// Maximum mutation perturbation, as a fraction
    /// of half the design-space width.
    pub mutation_scale: f64,
    /// Maximum perturbation applied around a seeding
    /// design when re-initializing a population from it.
    pub seed_spread: f64,
    /// Seed of the optimizer's random number generator.
    pub seed: u64,
}

impl OptimizerConfig {
    /// Returns a "zero-valued" configuration.
    /// All values are 0.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments,
    /// as every design collapses onto 0. It is meant as a way to
    /// abbreviate configuration instantiation.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::OptimizerConfig;
    ///
    /// let cfg = OptimizerConfig {
    ///     lower_bound: -1.0,
    ///     upper_bound: 1.0,
    ///     crossover_weight: 0.75,
    ///     ..OptimizerConfig::zero()
    /// };
    /// assert_eq!(cfg.mutation_scale, 0.0);
    /// ```
    pub const fn zero() -> OptimizerConfig {
        OptimizerConfig {
            lower_bound: 0.0,
            upper_bound: 0.0,
            crossover_weight: 0.0,
            mutation_scale: 0.0,
            seed_spread: 0.0,
            seed: 0,
        }
    }

    /// Returns the width of the design space.
    pub fn span(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Clamps a value into the design bounds.
    pub fn constrain(&self, value: f64) -> f64 {
        value.clamp(self.lower_bound, self.upper_bound)
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            lower_bound: 0.0,
            upper_bound: 1.0,
            crossover_weight: 0.5,
            mutation_scale: 0.05,
            seed_spread: 0.25,
            seed: 0,
        }
    }
}

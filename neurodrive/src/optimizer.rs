//! A GeneticOptimizer is a fixed-size population of
//! designs, bred generation by generation using the
//! reported fitness of each design as selective pressure.
mod config;
mod design;
mod errors;
pub mod logging;

pub use config::OptimizerConfig;
pub use design::Design;
pub use errors::OptimizerError;

use rand::prelude::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A population of designs evolved through
/// tournament selection, weighted crossover,
/// and bounded uniform mutation.
#[derive(Clone, Debug)]
pub struct GeneticOptimizer {
    designs: Vec<Design>,
    design_length: usize,
    generation: usize,
    config: OptimizerConfig,
    rng: ChaCha8Rng,
}

impl GeneticOptimizer {
    /// Creates a new optimizer with `population_size` designs
    /// of `design_length` variables each, drawn uniformly
    /// from the configured bounds.
    ///
    /// # Errors
    /// Returns [`OptimizerError::InvalidArgument`] if either size is 0,
    /// the bounds are not finite or inverted, the crossover weight
    /// lies outside [0, 1], or the mutation scale or seed spread is
    /// not finite.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::{GeneticOptimizer, OptimizerConfig};
    ///
    /// let optimizer = GeneticOptimizer::new(4, 3, OptimizerConfig::default()).unwrap();
    /// assert_eq!(optimizer.population_size(), 4);
    /// assert_eq!(optimizer.design(0).unwrap().len(), 3);
    ///
    /// assert!(GeneticOptimizer::new(0, 3, OptimizerConfig::default()).is_err());
    /// ```
    pub fn new(
        population_size: usize,
        design_length: usize,
        config: OptimizerConfig,
    ) -> Result<GeneticOptimizer, OptimizerError> {
        if population_size == 0 {
            return Err(OptimizerError::InvalidArgument("population size must be positive"));
        }
        if design_length == 0 {
            return Err(OptimizerError::InvalidArgument("design length must be positive"));
        }
        if !config.lower_bound.is_finite() || !config.upper_bound.is_finite() {
            return Err(OptimizerError::InvalidArgument("design bounds must be finite"));
        }
        if config.lower_bound > config.upper_bound {
            return Err(OptimizerError::InvalidArgument(
                "lower bound must not exceed upper bound",
            ));
        }
        if !(0.0..=1.0).contains(&config.crossover_weight) {
            return Err(OptimizerError::InvalidArgument(
                "crossover weight must lie in [0, 1]",
            ));
        }
        if !config.mutation_scale.is_finite() || !config.seed_spread.is_finite() {
            return Err(OptimizerError::InvalidArgument(
                "mutation scale and seed spread must be finite",
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let designs = (0..population_size)
            .map(|_| {
                Design::new(
                    (0..design_length)
                        .map(|_| rng.gen_range(config.lower_bound..=config.upper_bound))
                        .collect(),
                )
            })
            .collect();

        Ok(GeneticOptimizer {
            designs,
            design_length,
            generation: 0,
            config,
            rng,
        })
    }

    /// Re-initializes every design around `center`, perturbing
    /// each variable by up to `seed_spread` in either direction.
    /// Fitness values are reset to 0.
    ///
    /// # Errors
    /// Returns an error if `center` is not exactly
    /// `design_length` variables long, or holds a non-finite value.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::{GeneticOptimizer, OptimizerConfig};
    ///
    /// let mut optimizer = GeneticOptimizer::new(8, 2, OptimizerConfig::default()).unwrap();
    /// optimizer.seed_population(&[0.5, 0.5]).unwrap();
    /// for design in optimizer.designs() {
    ///     assert!(design.variables().iter().all(|v| (v - 0.5).abs() <= 0.25));
    /// }
    ///
    /// assert!(optimizer.seed_population(&[0.5]).is_err());
    /// ```
    pub fn seed_population(&mut self, center: &[f64]) -> Result<(), OptimizerError> {
        if center.len() != self.design_length {
            return Err(OptimizerError::DesignLengthMismatch {
                expected: self.design_length,
                found: center.len(),
            });
        }
        if !center.iter().all(|c| c.is_finite()) {
            return Err(OptimizerError::InvalidArgument("seed center must be finite"));
        }
        let spread = self.config.seed_spread;
        for design in &mut self.designs {
            for (v, c) in design.variables_mut().iter_mut().zip(center) {
                *v = self.config.constrain(c + spread * self.rng.gen_range(-1.0..=1.0_f64));
            }
            design.set_fitness(0.0);
        }
        Ok(())
    }

    /// Returns the variables of the `index`th design.
    ///
    /// # Errors
    /// Returns [`OptimizerError::IndexOutOfRange`] if
    /// `index` is not a valid population slot.
    pub fn design(&self, index: usize) -> Result<&[f64], OptimizerError> {
        self.designs
            .get(index)
            .map(Design::variables)
            .ok_or(OptimizerError::IndexOutOfRange {
                index,
                size: self.designs.len(),
            })
    }

    /// Returns the fitness of the `index`th design.
    ///
    /// # Errors
    /// Returns [`OptimizerError::IndexOutOfRange`] if
    /// `index` is not a valid population slot.
    pub fn fitness(&self, index: usize) -> Result<f64, OptimizerError> {
        self.designs
            .get(index)
            .map(Design::fitness)
            .ok_or(OptimizerError::IndexOutOfRange {
                index,
                size: self.designs.len(),
            })
    }

    /// Records the fitness scored by the `index`th design.
    ///
    /// # Errors
    /// Returns [`OptimizerError::IndexOutOfRange`] if
    /// `index` is not a valid population slot.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::{GeneticOptimizer, OptimizerConfig};
    ///
    /// let mut optimizer = GeneticOptimizer::new(2, 1, OptimizerConfig::default()).unwrap();
    /// optimizer.set_fitness(1, 3.5).unwrap();
    /// assert_eq!(optimizer.fitness(1).unwrap(), 3.5);
    /// assert!(optimizer.set_fitness(2, 1.0).is_err());
    /// ```
    pub fn set_fitness(&mut self, index: usize, fitness: f64) -> Result<(), OptimizerError> {
        let size = self.designs.len();
        let design = self
            .designs
            .get_mut(index)
            .ok_or(OptimizerError::IndexOutOfRange { index, size })?;
        design.set_fitness(fitness);
        Ok(())
    }

    /// Replaces the population with the next generation.
    ///
    /// Every slot `i` runs two tournaments between itself and
    /// a uniformly drawn rival `j ≠ i`, keeping the fitter
    /// contender (ties go to the rival). The two winners are
    /// blended with the fitter one weighted by `crossover_weight`,
    /// mutated, and clamped into the design bounds.
    ///
    /// # Examples
    /// ```
    /// use neurodrive::{GeneticOptimizer, OptimizerConfig};
    ///
    /// let mut optimizer = GeneticOptimizer::new(6, 4, OptimizerConfig::default()).unwrap();
    /// optimizer.advance_generation();
    /// assert_eq!(optimizer.generation(), 1);
    /// assert_eq!(optimizer.population_size(), 6);
    /// ```
    pub fn advance_generation(&mut self) {
        let offspring = (0..self.designs.len())
            .map(|i| {
                let a = self.tournament(i);
                let b = self.tournament(i);
                let (hi, lo) = if self.designs[a].fitness() > self.designs[b].fitness() {
                    (a, b)
                } else {
                    (b, a)
                };
                self.breed(hi, lo)
            })
            .collect();
        self.designs = offspring;
        self.generation += 1;
    }

    /// Returns the index of the winner of a tournament
    /// between design `i` and a random rival.
    fn tournament(&mut self, i: usize) -> usize {
        let size = self.designs.len();
        if size < 2 {
            return i;
        }
        // Uniform over every index but `i`.
        let mut j = self.rng.gen_range(0..size - 1);
        if j >= i {
            j += 1;
        }
        if self.designs[i].fitness() > self.designs[j].fitness() {
            i
        } else {
            j
        }
    }

    fn breed(&mut self, hi: usize, lo: usize) -> Design {
        let config = &self.config;
        let rng = &mut self.rng;
        let w = config.crossover_weight;
        let amplitude = config.mutation_scale * config.span() / 2.0;
        let variables = self.designs[hi]
            .variables()
            .iter()
            .zip(self.designs[lo].variables())
            .map(|(h, l)| {
                let mutation = rng.gen_range(-1.0..=1.0_f64) * amplitude;
                config.constrain(w * h + (1.0 - w) * l + mutation)
            })
            .collect();
        Design::new(variables)
    }

    /// Returns the design with the highest fitness.
    pub fn champion(&self) -> &Design {
        self.designs
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
            .expect("optimizer populations are never empty")
    }

    /// Returns an iterator over the current population.
    pub fn designs(&self) -> impl Iterator<Item = &Design> {
        self.designs.iter()
    }

    /// Returns the number of generations evolved so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the number of designs in the population.
    pub fn population_size(&self) -> usize {
        self.designs.len()
    }

    /// Returns the number of variables in each design.
    pub fn design_length(&self) -> usize {
        self.design_length
    }

    /// Returns the optimizer's configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within_bounds(optimizer: &GeneticOptimizer) -> bool {
        let cfg = optimizer.config();
        optimizer.designs().all(|d| {
            d.variables()
                .iter()
                .all(|v| *v >= cfg.lower_bound && *v <= cfg.upper_bound)
        })
    }

    #[test]
    fn new_rejects_bad_arguments() {
        assert_eq!(
            GeneticOptimizer::new(0, 1, OptimizerConfig::default()).unwrap_err(),
            OptimizerError::InvalidArgument("population size must be positive")
        );
        assert!(GeneticOptimizer::new(1, 0, OptimizerConfig::default()).is_err());
        let inverted = OptimizerConfig {
            lower_bound: 1.0,
            upper_bound: -1.0,
            ..OptimizerConfig::default()
        };
        assert!(GeneticOptimizer::new(1, 1, inverted).is_err());
        let heavy = OptimizerConfig {
            crossover_weight: 1.5,
            ..OptimizerConfig::default()
        };
        assert!(GeneticOptimizer::new(1, 1, heavy).is_err());
        for scale in [f64::NAN, f64::INFINITY] {
            let wild = OptimizerConfig {
                mutation_scale: scale,
                ..OptimizerConfig::default()
            };
            assert!(GeneticOptimizer::new(4, 2, wild).is_err());
            let scattered = OptimizerConfig {
                seed_spread: scale,
                ..OptimizerConfig::default()
            };
            assert!(GeneticOptimizer::new(4, 2, scattered).is_err());
        }
    }

    #[test]
    fn seed_center_must_be_finite() {
        let mut optimizer = GeneticOptimizer::new(4, 2, OptimizerConfig::default()).unwrap();
        assert!(optimizer.seed_population(&[0.5, f64::NAN]).is_err());
        assert!(within_bounds(&optimizer));
    }

    #[test]
    fn new_draws_within_bounds() {
        let cfg = OptimizerConfig {
            lower_bound: -1.0,
            upper_bound: 1.0,
            ..OptimizerConfig::default()
        };
        let optimizer = GeneticOptimizer::new(50, 20, cfg).unwrap();
        assert!(within_bounds(&optimizer));
        assert!(optimizer.designs().all(|d| d.fitness() == 0.0));
    }

    #[test]
    fn out_of_range_access() {
        let mut optimizer = GeneticOptimizer::new(3, 2, OptimizerConfig::default()).unwrap();
        assert_eq!(
            optimizer.design(3).unwrap_err(),
            OptimizerError::IndexOutOfRange { index: 3, size: 3 }
        );
        assert!(optimizer.fitness(7).is_err());
        assert!(optimizer.set_fitness(3, 1.0).is_err());
    }

    #[test]
    fn advance_generation_stays_within_bounds() {
        let cfg = OptimizerConfig {
            lower_bound: -1.0,
            upper_bound: 1.0,
            mutation_scale: 0.5,
            ..OptimizerConfig::default()
        };
        let mut optimizer = GeneticOptimizer::new(30, 10, cfg).unwrap();
        for generation in 0..20 {
            for i in 0..optimizer.population_size() {
                // Alternate between all-equal and spread fitness distributions.
                let fitness = if generation % 2 == 0 { 1.0 } else { i as f64 };
                optimizer.set_fitness(i, fitness).unwrap();
            }
            optimizer.advance_generation();
            assert!(within_bounds(&optimizer));
            assert_eq!(optimizer.generation(), generation + 1);
            assert_eq!(optimizer.population_size(), 30);
            assert!(optimizer.designs().all(|d| d.variables().len() == 10));
        }
    }

    #[test]
    fn offspring_fitness_is_reset() {
        let mut optimizer = GeneticOptimizer::new(4, 2, OptimizerConfig::default()).unwrap();
        for i in 0..4 {
            optimizer.set_fitness(i, 10.0).unwrap();
        }
        optimizer.advance_generation();
        assert!(optimizer.designs().all(|d| d.fitness() == 0.0));
    }

    #[test]
    fn same_seed_same_population() {
        let run = |seed| {
            let cfg = OptimizerConfig {
                seed,
                ..OptimizerConfig::default()
            };
            let mut optimizer = GeneticOptimizer::new(10, 5, cfg).unwrap();
            for _ in 0..5 {
                for i in 0..10 {
                    let fitness = optimizer.design(i).unwrap().iter().sum();
                    optimizer.set_fitness(i, fitness).unwrap();
                }
                optimizer.advance_generation();
            }
            optimizer.designs().cloned().collect::<Vec<_>>()
        };
        assert_eq!(run(3), run(3));
        assert_ne!(run(3), run(4));
    }

    #[test]
    fn unmutated_offspring_blend_tournament_winners() {
        let cfg = OptimizerConfig {
            mutation_scale: 0.0,
            ..OptimizerConfig::default()
        };
        let mut optimizer = GeneticOptimizer::new(2, 1, cfg).unwrap();
        let fit = optimizer.design(1).unwrap()[0];
        optimizer.set_fitness(0, 0.0).unwrap();
        optimizer.set_fitness(1, 1.0).unwrap();
        optimizer.advance_generation();
        // With two designs every tournament is won by the fitter one.
        for design in optimizer.designs() {
            assert!((design.variables()[0] - fit).abs() < 1e-12);
        }
    }

    #[test]
    fn single_design_population_evolves() {
        let mut optimizer = GeneticOptimizer::new(1, 3, OptimizerConfig::default()).unwrap();
        optimizer.advance_generation();
        assert_eq!(optimizer.generation(), 1);
        assert!(within_bounds(&optimizer));
    }

    #[test]
    fn champion() {
        let mut optimizer = GeneticOptimizer::new(5, 1, OptimizerConfig::default()).unwrap();
        for (i, f) in [3.0, -1.0, 7.5, 2.0, 7.0].iter().enumerate() {
            optimizer.set_fitness(i, *f).unwrap();
        }
        assert_eq!(optimizer.champion().fitness(), 7.5);
    }

    #[test]
    fn seeded_population_stays_near_center() {
        let cfg = OptimizerConfig {
            lower_bound: -1.0,
            upper_bound: 1.0,
            ..OptimizerConfig::default()
        };
        let mut optimizer = GeneticOptimizer::new(20, 3, cfg).unwrap();
        optimizer.set_fitness(0, 5.0).unwrap();
        let center = [0.9, 0.0, -0.95];
        optimizer.seed_population(&center).unwrap();
        assert!(within_bounds(&optimizer));
        for design in optimizer.designs() {
            assert_eq!(design.fitness(), 0.0);
            for (v, c) in design.variables().iter().zip(&center) {
                assert!((v - c).abs() <= 0.25 + 1e-12);
            }
        }
        assert_eq!(
            optimizer.seed_population(&[0.0; 4]).unwrap_err(),
            OptimizerError::DesignLengthMismatch {
                expected: 3,
                found: 4
            }
        );
    }
}

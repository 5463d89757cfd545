//! A generational genetic optimizer for fixed-length real-valued designs,
//! built to evolve the connection weights of small neural-network
//! controllers from scalar fitness feedback.
//!
//! A [`GeneticOptimizer`] owns a fixed-size population of designs. Callers
//! evaluate each design in turn, report its fitness, and then call
//! [`GeneticOptimizer::advance_generation`] to breed the next population
//! through tournament selection, weighted crossover and bounded mutation.
//! Anything whose parameters can be loaded from a design vector may
//! implement the [`Phenotype`] trait; a layered neural network doing so is
//! supplied by the `neurodrive-nn` crate.
//!
//! Evolution is elitism-free: the best design of a generation is not carried
//! over automatically, so callers needing a monotonic best must keep their
//! own copy.
//!
//! # Example usage: maximizing a one-dimensional function
//! ```
//! use neurodrive::{GeneticOptimizer, OptimizerConfig};
//!
//! fn evaluate(design: &[f64]) -> f64 {
//!     -(design[0] - 0.3).powi(2)
//! }
//!
//! let mut optimizer = GeneticOptimizer::new(20, 1, OptimizerConfig::default()).unwrap();
//! for _ in 0..30 {
//!     for i in 0..optimizer.population_size() {
//!         let fitness = evaluate(optimizer.design(i).unwrap());
//!         optimizer.set_fitness(i, fitness).unwrap();
//!     }
//!     optimizer.advance_generation();
//! }
//! assert_eq!(optimizer.generation(), 30);
//! for design in optimizer.designs() {
//!     assert!(design.variables().iter().all(|v| (0.0..=1.0).contains(v)));
//! }
//! ```

mod optimizer;
mod phenotype;

pub use optimizer::*;
pub use phenotype::*;

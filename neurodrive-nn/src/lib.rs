//! # Neurodrive-NN
//! A layered, fully-connected feedforward neural network implementing the
//! [`neurodrive` crate](../neurodrive/index.html)'s `Phenotype` trait, so that its link gains
//! can be evolved by a `GeneticOptimizer`.
//!
//! Provides a [`NeuralNetwork`] type which:
//! - is built from a list of layer sizes, with a constant-valued bias node
//!   appended to every non-output layer,
//! - is evaluated by a single synchronous weighted-sum pass,
//! - round-trips its topology and gains through a flat text format.
//!
//! [`NeuralNetwork`]: crate::networks::NeuralNetwork
//!
//! # Example usage: evolving gains towards a target output
//! ```
//! use neurodrive::{GeneticOptimizer, OptimizerConfig, Phenotype};
//! use neurodrive_nn::networks::NeuralNetwork;
//!
//! let mut network = NeuralNetwork::from_layers(&[2, 1]).unwrap();
//! let config = OptimizerConfig {
//!     lower_bound: -1.0,
//!     upper_bound: 1.0,
//!     ..OptimizerConfig::default()
//! };
//! let mut optimizer = GeneticOptimizer::new(16, network.design_len(), config).unwrap();
//!
//! for _ in 0..20 {
//!     for i in 0..optimizer.population_size() {
//!         network.load_design(optimizer.design(i).unwrap());
//!         network.set_input(0, 1.0).unwrap();
//!         network.set_input(1, 0.5).unwrap();
//!         network.evaluate().unwrap();
//!         let error = (network.get_output(0).unwrap() - 0.25).abs();
//!         optimizer.set_fitness(i, -error).unwrap();
//!     }
//!     optimizer.advance_generation();
//! }
//!
//! let text = network.serialize();
//! let restored: NeuralNetwork = text.parse().unwrap();
//! assert_eq!(restored.serialize(), text);
//! ```

pub mod networks;

/// Identifier of a node, equal to its insertion order.
pub type NodeId = usize;

/// Identifier of a link, equal to its insertion order.
pub type LinkId = usize;

use super::DriverError;
use crate::cars::Car;

use neurodrive::logging::{EvolutionLogger, ReportingLevel};
use neurodrive::{GeneticOptimizer, OptimizerConfig, Phenotype};
use neurodrive_nn::networks::NeuralNetwork;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration data for a training session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimConfig {
    /// Number of designs per generation.
    pub population_size: usize,
    /// Size of the hidden layer as a multiple of the input count.
    pub hidden_scale: usize,
    /// Bounds and operators of the genetic optimizer.
    pub optimizer: OptimizerConfig,
    /// How much of every generation the evolution log keeps.
    pub reporting_level: ReportingLevel,
}

impl OptimConfig {
    /// Returns a "zero-valued" configuration.
    ///
    /// # Note
    /// This value is not a usable configuration: sessions refuse
    /// empty populations and hidden layers. It is meant as a way
    /// to abbreviate configuration instantiation.
    pub const fn zero() -> OptimConfig {
        OptimConfig {
            population_size: 0,
            hidden_scale: 0,
            optimizer: OptimizerConfig::zero(),
            reporting_level: ReportingLevel::NoDesigns,
        }
    }
}

impl Default for OptimConfig {
    fn default() -> Self {
        OptimConfig {
            population_size: 200,
            hidden_scale: 2,
            optimizer: OptimizerConfig::default(),
            reporting_level: ReportingLevel::Champion,
        }
    }
}

/// Where a training session is within an episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimPhase {
    /// The design at the index must be loaded into
    /// the network before the next episode starts.
    AwaitingDesignLoad(usize),
    /// The design at the index is being driven.
    Running(usize),
}

/// Bookkeeping of a neuroevolution session: the network under
/// test, the optimizer proposing its gains, and a monotonic
/// record of the best network seen so far.
///
/// An episode is driven by calling [`step_once`](OptimState::step_once)
/// every tick, then [`report_fitness`](OptimState::report_fitness) and
/// [`advance`](OptimState::advance) once it ends.
#[derive(Clone, Debug)]
pub struct OptimState {
    config: OptimConfig,
    optim_network: NeuralNetwork,
    best_network: NeuralNetwork,
    optimizer: GeneticOptimizer,
    logger: EvolutionLogger,
    design_index: usize,
    generation: usize,
    best_fitness: f64,
    best_generation: usize,
    best_update_count: usize,
    load_pending: bool,
}

impl OptimState {
    /// Creates a session evolving a `[inputs, hidden_scale × inputs, outputs]`
    /// network.
    ///
    /// # Errors
    /// Fails if any layer would be empty or the optimizer
    /// rejects the population size or its configuration.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_sim::states::{OptimConfig, OptimPhase, OptimState};
    ///
    /// let state = OptimState::new(7, 20, OptimConfig::default()).unwrap();
    /// assert_eq!(state.optim_network().size_inputs(), 7);
    /// assert_eq!(state.optim_network().size_outputs(), 20);
    /// assert_eq!(state.optimizer().population_size(), 200);
    /// assert_eq!(state.state(), OptimPhase::AwaitingDesignLoad(0));
    /// ```
    pub fn new(
        num_inputs: usize,
        num_outputs: usize,
        config: OptimConfig,
    ) -> Result<OptimState, DriverError> {
        let optim_network = NeuralNetwork::from_layers(&[
            num_inputs,
            num_inputs * config.hidden_scale,
            num_outputs,
        ])?;
        let optimizer = GeneticOptimizer::new(
            config.population_size,
            optim_network.design_len(),
            config.optimizer.clone(),
        )?;
        info!(
            inputs = num_inputs,
            outputs = num_outputs,
            links = optim_network.links().len(),
            population = config.population_size,
            "training session created"
        );
        Ok(OptimState {
            best_network: optim_network.clone(),
            logger: EvolutionLogger::new(config.reporting_level),
            config,
            optim_network,
            optimizer,
            design_index: 0,
            generation: 0,
            best_fitness: 0.0,
            best_generation: 0,
            best_update_count: 0,
            load_pending: true,
        })
    }

    /// Loads the current design into the network if a load is pending.
    /// Returns true if it did, in which case the car must be reset.
    pub fn step_once(&mut self) -> bool {
        if !self.load_pending {
            return false;
        }
        let design = self
            .optimizer
            .design(self.design_index)
            .expect("design index is kept below the population size");
        self.optim_network.load_design(design);
        self.load_pending = false;
        true
    }

    /// Reports the distance driven by the car as the current design's fitness.
    pub fn report_episode(&mut self, car: &Car) -> bool {
        self.report_fitness(car.distance())
    }

    /// Records the fitness of the current design. Returns true if it
    /// beats every fitness recorded so far, in which case the network
    /// is kept as the best network.
    ///
    /// # Examples
    /// ```
    /// use neurodrive_sim::states::{OptimConfig, OptimState};
    ///
    /// let config = OptimConfig { population_size: 3, ..OptimConfig::default() };
    /// let mut state = OptimState::new(2, 1, config).unwrap();
    /// state.step_once();
    /// assert!(state.report_fitness(12.0));
    /// state.advance();
    /// state.step_once();
    /// assert!(!state.report_fitness(4.0));
    /// assert_eq!(state.best_fitness(), 12.0);
    /// assert_eq!(state.best_update_count(), 1);
    /// ```
    pub fn report_fitness(&mut self, fitness: f64) -> bool {
        self.optimizer
            .set_fitness(self.design_index, fitness)
            .expect("design index is kept below the population size");
        if fitness > self.best_fitness {
            self.best_fitness = fitness;
            self.best_network = self.optim_network.clone();
            self.best_update_count += 1;
            self.best_generation = self.generation;
            debug!(
                fitness,
                generation = self.generation,
                design = self.design_index,
                "new best design"
            );
            true
        } else {
            false
        }
    }

    /// Moves on to the next design, breeding a new
    /// generation after the last one, and arms a design load.
    pub fn advance(&mut self) {
        self.design_index += 1;
        if self.design_index >= self.optimizer.population_size() {
            self.logger
                .log(&self.optimizer, &|d| [d.fitness()], ["fitness"]);
            if let Some(stats) = self.logger.last().and_then(|log| log.stat("fitness")) {
                info!(
                    generation = self.generation,
                    max = stats.maximum,
                    mean = stats.mean,
                    median = stats.median,
                    best = self.best_fitness,
                    "generation complete"
                );
            }
            self.optimizer.advance_generation();
            self.generation += 1;
            self.design_index = 0;
        }
        self.load_pending = true;
    }

    /// Arms a design load without moving to another design.
    pub fn request_design_load(&mut self) {
        self.load_pending = true;
    }

    /// Re-seeds the population around the gains of a stored network.
    ///
    /// # Errors
    /// Fails if the network's link count differs from the design length.
    pub fn seed_from(&mut self, network: &NeuralNetwork) -> Result<(), DriverError> {
        self.optimizer.seed_population(&network.to_design())?;
        self.load_pending = true;
        info!(
            spread = self.optimizer.config().seed_spread,
            "population seeded from stored network"
        );
        Ok(())
    }

    pub fn state(&self) -> OptimPhase {
        if self.load_pending {
            OptimPhase::AwaitingDesignLoad(self.design_index)
        } else {
            OptimPhase::Running(self.design_index)
        }
    }

    /// The network whose gains are being tested.
    pub fn optim_network(&self) -> &NeuralNetwork {
        &self.optim_network
    }

    pub(super) fn optim_network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.optim_network
    }

    /// A copy of the network that achieved [`best_fitness`](OptimState::best_fitness).
    pub fn best_network(&self) -> &NeuralNetwork {
        &self.best_network
    }

    pub(super) fn best_network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.best_network
    }

    /// Best fitness so far. Starts at 0, so designs
    /// that do not move forward never count as best.
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The generation in which the best network was found.
    pub fn best_generation(&self) -> usize {
        self.best_generation
    }

    pub fn design_index(&self) -> usize {
        self.design_index
    }

    /// Number of times the best network was replaced.
    pub fn best_update_count(&self) -> usize {
        self.best_update_count
    }

    pub fn optimizer(&self) -> &GeneticOptimizer {
        &self.optimizer
    }

    pub fn logger(&self) -> &EvolutionLogger {
        &self.logger
    }

    pub fn config(&self) -> &OptimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(population_size: usize) -> OptimState {
        let config = OptimConfig {
            population_size,
            ..OptimConfig::default()
        };
        OptimState::new(2, 1, config).unwrap()
    }

    #[test]
    fn topology() {
        let state = small(4);
        let layers: Vec<_> = state
            .optim_network()
            .layers()
            .iter()
            .map(|l| l.node_ids().len())
            .collect();
        // Bias nodes are appended to the input and hidden layers.
        assert_eq!(layers, vec![3, 5, 1]);
        assert_eq!(
            state.optimizer().design_length(),
            state.optim_network().links().len()
        );
    }

    #[test]
    fn invalid_sessions() {
        assert!(matches!(
            OptimState::new(0, 1, OptimConfig::default()),
            Err(DriverError::Topology(_))
        ));
        assert!(matches!(
            OptimState::new(2, 1, OptimConfig::zero()),
            Err(DriverError::Topology(_))
        ));
        let config = OptimConfig {
            population_size: 0,
            ..OptimConfig::default()
        };
        assert!(matches!(
            OptimState::new(2, 1, config),
            Err(DriverError::Optimizer(_))
        ));
    }

    #[test]
    fn design_load_happens_once() {
        let mut state = small(4);
        assert_eq!(state.state(), OptimPhase::AwaitingDesignLoad(0));
        assert!(state.step_once());
        assert_eq!(state.state(), OptimPhase::Running(0));
        assert!(!state.step_once());
        assert_eq!(
            state.optim_network().gains(),
            state.optimizer().design(0).unwrap()
        );

        state.request_design_load();
        assert!(state.step_once());
        assert_eq!(state.design_index(), 0);
    }

    #[test]
    fn advance_rolls_generations() {
        let mut state = small(3);
        for i in 0..3 {
            assert_eq!(state.design_index(), i);
            state.step_once();
            state.report_fitness(i as f64);
            state.advance();
        }
        assert_eq!(state.generation(), 1);
        assert_eq!(state.design_index(), 0);
        assert_eq!(state.optimizer().generation(), 1);
        assert_eq!(state.state(), OptimPhase::AwaitingDesignLoad(0));

        let log = state.logger().last().unwrap();
        assert_eq!(log.generation_number, 0);
        assert_eq!(log.stat("fitness").unwrap().maximum, 2.0);
    }

    #[test]
    fn fitness_is_recorded_for_every_slot() {
        let mut state = small(4);
        for i in 0..4 {
            assert!(state.step_once());
            assert_eq!(
                state.optim_network().gains(),
                state.optimizer().design(i).unwrap()
            );
            state.report_fitness(10.0 + i as f64);
            assert_eq!(state.optimizer().fitness(i).unwrap(), 10.0 + i as f64);
            if i < 3 {
                state.advance();
            }
        }
        assert_eq!(state.generation(), 0);
        assert_eq!(state.design_index(), 3);
    }

    #[test]
    fn best_network_is_monotonic() {
        let mut state = small(3);
        let fitnesses = [5.0, 3.0, 8.0, -1.0, 8.0, 7.5];
        let mut best_gains = vec![];
        for &fitness in &fitnesses {
            state.step_once();
            if fitness > state.best_fitness() {
                best_gains = state.optim_network().gains();
            }
            state.report_fitness(fitness);
            state.advance();
        }
        assert_eq!(state.best_fitness(), 8.0);
        assert_eq!(state.best_update_count(), 2);
        assert_eq!(state.best_generation(), 0);
        assert_eq!(state.best_network().gains(), best_gains);
    }

    #[test]
    fn non_positive_fitness_never_counts_as_best() {
        let mut state = small(2);
        state.step_once();
        assert!(!state.report_fitness(0.0));
        assert!(!state.report_fitness(-3.0));
        assert_eq!(state.best_update_count(), 0);
    }

    #[test]
    fn seeding_from_network() {
        let mut state = small(5);
        let mut stored = state.optim_network().clone();
        let centre = vec![0.5; stored.links().len()];
        stored.set_gains(&centre);

        state.step_once();
        state.seed_from(&stored).unwrap();
        assert_eq!(state.state(), OptimPhase::AwaitingDesignLoad(0));
        let spread = state.optimizer().config().seed_spread;
        for design in state.optimizer().designs() {
            assert!(design
                .variables()
                .iter()
                .all(|v| (v - 0.5).abs() <= spread + 1e-12));
        }

        let other = NeuralNetwork::from_layers(&[3, 1]).unwrap();
        assert!(matches!(
            state.seed_from(&other),
            Err(DriverError::Optimizer(_))
        ));
    }
}

use super::{DriverError, OptimConfig, OptimState};
use crate::cars::{Car, CarConfig};
use crate::tracks::{RoadGrid, TrackError};

use neurodrive_nn::networks::{NetworkError, NeuralNetwork};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Decoded inputs smaller than this are reported as 0.
const INPUT_DEADBAND: f64 = 0.001;

/// Which network controls the car.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Designs proposed by the optimizer are driven in turn.
    Optimizing,
    /// The best network found so far drives.
    ReplayBest,
    /// A network loaded from storage drives.
    ReplayFile,
}

/// Why an optimization episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeEnd {
    /// The car left the road.
    Collided,
    /// The car ran out of ticks.
    StepBudget,
    /// The car stopped, or reversed too far.
    Stuck,
}

/// Summary of a finished optimization episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeReport {
    pub design_index: usize,
    pub generation: usize,
    /// Distance travelled, used as the design's fitness.
    pub fitness: f64,
    /// True if the design beat the best fitness so far.
    pub improved: bool,
    /// Number of best-network replacements, including this one.
    pub best_update_count: usize,
    /// Ticks driven.
    pub steps: u64,
    pub end: EpisodeEnd,
}

/// Configuration data for a [`Driver`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Network outputs averaged into the forward input.
    pub forward_outputs: usize,
    /// Network outputs averaged into the turn input.
    pub turn_outputs: usize,
    /// Simulation ticks per simulated second.
    pub base_frequency: u64,
    /// Episode length limit, in simulated seconds.
    pub step_budget_factor: u64,
    /// Episodes end once the filtered forward input
    /// is smaller than this in magnitude.
    pub stuck_forward_threshold: f64,
    /// Episodes end once the distance drops below this.
    pub stuck_distance_threshold: f64,
    /// Whether to feed `1 - d` for every sensor distance `d`
    /// as additional network inputs.
    pub include_inverse_sensors: bool,
    pub car: CarConfig,
    pub optim: OptimConfig,
}

impl DriverConfig {
    /// Returns a "zero-valued" configuration.
    ///
    /// # Note
    /// This value is not a usable configuration.
    /// It is meant as a way to abbreviate configuration instantiation.
    pub const fn zero() -> DriverConfig {
        DriverConfig {
            forward_outputs: 0,
            turn_outputs: 0,
            base_frequency: 0,
            step_budget_factor: 0,
            stuck_forward_threshold: 0.0,
            stuck_distance_threshold: 0.0,
            include_inverse_sensors: false,
            car: CarConfig::zero(),
            optim: OptimConfig::zero(),
        }
    }

    /// Maximum number of ticks in an optimization episode.
    pub fn step_budget(&self) -> u64 {
        self.step_budget_factor * self.base_frequency
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            forward_outputs: 10,
            turn_outputs: 10,
            base_frequency: 100,
            step_budget_factor: 300,
            stuck_forward_threshold: 1e-3,
            stuck_distance_threshold: -10.0,
            include_inverse_sensors: false,
            car: CarConfig::default(),
            optim: OptimConfig::default(),
        }
    }
}

/// Drives a car around a set of tracks with a neural network,
/// evolving the network while in [`Mode::Optimizing`].
///
/// # Examples
/// ```
/// use neurodrive_sim::states::{Driver, DriverConfig, Mode, OptimConfig};
/// use neurodrive_sim::tracks::{layouts, RoadGrid};
///
/// let config = DriverConfig {
///     optim: OptimConfig { population_size: 3, ..OptimConfig::default() },
///     ..DriverConfig::default()
/// };
/// let tracks = vec![RoadGrid::from_layout(&layouts::hairpin()).unwrap()];
/// let mut driver = Driver::new(config, tracks, None).unwrap();
///
/// let mut episodes = 0;
/// driver.run_generations(1, |_| episodes += 1).unwrap();
/// assert_eq!(episodes, 3);
/// assert_eq!(driver.generation(), 1);
/// assert!(!driver.set_mode(Mode::ReplayFile));
/// ```
#[derive(Clone, Debug)]
pub struct Driver {
    config: DriverConfig,
    tracks: Vec<RoadGrid>,
    track_index: usize,
    car: Car,
    optim: OptimState,
    file_network: Option<NeuralNetwork>,
    mode: Mode,
    forward: f64,
    turn: f64,
}

impl Driver {
    /// Creates a driver in [`Mode::Optimizing`] on the first track.
    ///
    /// A `file_network` whose input or output count does not
    /// fit the car is discarded with a warning.
    ///
    /// # Errors
    /// Fails if `tracks` is empty, the car configuration is
    /// invalid, or the training session cannot be built.
    pub fn new(
        config: DriverConfig,
        tracks: Vec<RoadGrid>,
        file_network: Option<NeuralNetwork>,
    ) -> Result<Driver, DriverError> {
        if tracks.is_empty() {
            return Err(DriverError::NoTracks);
        }
        let car = Car::new(config.car.clone())?;
        let inputs = if config.include_inverse_sensors {
            2 * car.sensor_count()
        } else {
            car.sensor_count()
        };
        let outputs = config.forward_outputs + config.turn_outputs;
        let optim = OptimState::new(inputs, outputs, config.optim.clone())?;

        let file_network = file_network.filter(|network| {
            let found = (network.size_inputs(), network.size_outputs());
            if found == (inputs, outputs) {
                true
            } else {
                warn!(
                    "{}",
                    DriverError::TopologyMismatch {
                        expected: (inputs, outputs),
                        found,
                    }
                );
                false
            }
        });

        let mut driver = Driver {
            config,
            tracks,
            track_index: 0,
            car,
            optim,
            file_network,
            mode: Mode::Optimizing,
            forward: 0.0,
            turn: 0.0,
        };
        driver.place_car();
        Ok(driver)
    }

    /// Switches the controlling network. Returns true if the mode changed.
    ///
    /// [`Mode::ReplayFile`] is refused when no file network is loaded.
    /// Any change restarts the car, and switching back to
    /// [`Mode::Optimizing`] restarts the current design's episode.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return false;
        }
        if mode == Mode::ReplayFile && self.file_network.is_none() {
            warn!("no file network loaded");
            return false;
        }
        info!(from = ?self.mode, to = ?mode, "mode changed");
        self.mode = mode;
        self.reset_car();
        self.optim.request_design_load();
        true
    }

    /// Selects the track at `index` and moves the car to its start.
    ///
    /// # Errors
    /// Fails if `index` does not refer to a loaded track.
    pub fn set_track(&mut self, index: usize) -> Result<(), DriverError> {
        if index >= self.tracks.len() {
            return Err(TrackError::TrackIndexOutOfRange {
                index,
                count: self.tracks.len(),
            }
            .into());
        }
        self.track_index = index;
        self.place_car();
        Ok(())
    }

    fn place_car(&mut self) {
        let (x, y, rotation) = self.tracks[self.track_index].start_pose();
        self.car.set_pos(x, y);
        self.car.set_start_rotation(rotation);
        self.car.sense(&self.tracks[self.track_index]);
    }

    /// Returns the car to the start of the current track.
    pub fn reset_car(&mut self) {
        self.car.reset();
        self.car.sense(&self.tracks[self.track_index]);
        self.forward = 0.0;
        self.turn = 0.0;
    }

    /// Runs one simulation tick.
    ///
    /// In [`Mode::Optimizing`], returns a report once the
    /// current design's episode ends. The next design is then
    /// loaded on the following tick.
    ///
    /// # Errors
    /// Fails if the controlling network rejects an evaluation.
    pub fn step(&mut self) -> Result<Option<EpisodeReport>, DriverError> {
        if self.mode == Mode::Optimizing && self.optim.step_once() {
            self.reset_car();
        }

        let network = controller(self.mode, &mut self.optim, &mut self.file_network);
        let count = self.car.sensor_count();
        for (i, reading) in self.car.sensors().enumerate() {
            network.set_input(i, reading.distance)?;
            if self.config.include_inverse_sensors {
                network.set_input(count + i, 1.0 - reading.distance)?;
            }
        }
        network.evaluate()?;
        self.forward = decode(network, 0, self.config.forward_outputs)?;
        self.turn = decode(
            network,
            self.config.forward_outputs,
            self.config.turn_outputs,
        )?;

        self.car
            .step_movement(&self.tracks[self.track_index], self.forward, self.turn);

        if self.mode != Mode::Optimizing {
            return Ok(None);
        }
        let end = if self.car.has_collided() {
            EpisodeEnd::Collided
        } else if self.car.step_count() > self.config.step_budget() {
            EpisodeEnd::StepBudget
        } else if self.car.forward_input().abs() < self.config.stuck_forward_threshold
            || self.car.distance() < self.config.stuck_distance_threshold
        {
            EpisodeEnd::Stuck
        } else {
            return Ok(None);
        };

        let design_index = self.optim.design_index();
        let generation = self.optim.generation();
        let improved = self.optim.report_episode(&self.car);
        let report = EpisodeReport {
            design_index,
            generation,
            fitness: self.car.distance(),
            improved,
            best_update_count: self.optim.best_update_count(),
            steps: self.car.step_count(),
            end,
        };
        debug!(?report, "episode ended");
        self.optim.advance();
        self.reset_car();
        Ok(Some(report))
    }

    /// Optimizes until `generations` more generations have been bred,
    /// passing every episode report to `on_episode`. Switches to
    /// [`Mode::Optimizing`] first if needed.
    pub fn run_generations<F>(
        &mut self,
        generations: usize,
        mut on_episode: F,
    ) -> Result<(), DriverError>
    where
        F: FnMut(&EpisodeReport),
    {
        self.set_mode(Mode::Optimizing);
        let target = self.optim.generation() + generations;
        while self.optim.generation() < target {
            if let Some(report) = self.step()? {
                on_episode(&report);
            }
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Distance travelled by the car in the current episode.
    pub fn current_fitness(&self) -> f64 {
        self.car.distance()
    }

    pub fn best_fitness(&self) -> f64 {
        self.optim.best_fitness()
    }

    pub fn generation(&self) -> usize {
        self.optim.generation()
    }

    pub fn design_index(&self) -> usize {
        self.optim.design_index()
    }

    /// The forward input decoded on the last tick.
    pub fn input_forward(&self) -> f64 {
        deadband(self.forward)
    }

    /// The turn input decoded on the last tick.
    pub fn input_right(&self) -> f64 {
        deadband(self.turn)
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn track(&self) -> &RoadGrid {
        &self.tracks[self.track_index]
    }

    pub fn track_index(&self) -> usize {
        self.track_index
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// The network controlling the car in the current mode.
    pub fn network(&self) -> &NeuralNetwork {
        match (self.mode, &self.file_network) {
            (Mode::Optimizing, _) => self.optim.optim_network(),
            (Mode::ReplayFile, Some(network)) => network,
            _ => self.optim.best_network(),
        }
    }

    pub fn file_network(&self) -> Option<&NeuralNetwork> {
        self.file_network.as_ref()
    }

    pub fn optim(&self) -> &OptimState {
        &self.optim
    }

    pub fn optim_mut(&mut self) -> &mut OptimState {
        &mut self.optim
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }
}

fn controller<'a>(
    mode: Mode,
    optim: &'a mut OptimState,
    file_network: &'a mut Option<NeuralNetwork>,
) -> &'a mut NeuralNetwork {
    match (mode, file_network) {
        (Mode::Optimizing, _) => optim.optim_network_mut(),
        (Mode::ReplayFile, Some(network)) => network,
        // ReplayFile is only selectable with a file network.
        _ => optim.best_network_mut(),
    }
}

/// Averages `count` outputs starting at `offset`,
/// negating those at even positions.
fn decode(network: &NeuralNetwork, offset: usize, count: usize) -> Result<f64, NetworkError> {
    if count == 0 {
        return Ok(0.0);
    }
    let mut sum = 0.0;
    for i in 0..count {
        let sign = if i % 2 == 0 { -1.0 } else { 1.0 };
        sum += sign * network.get_output(offset + i)?;
    }
    Ok(sum / count as f64)
}

fn deadband(value: f64) -> f64 {
    if value.abs() < INPUT_DEADBAND {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cars::SensorMount;
    use crate::tracks::layouts;

    use neurodrive::OptimizerConfig;

    fn tracks() -> Vec<RoadGrid> {
        layouts::builtin()
            .iter()
            .map(|layout| RoadGrid::from_layout(layout).unwrap())
            .collect()
    }

    /// Every design variable is fixed to `gain`.
    fn constant_gains(gain: f64, forward_outputs: usize, turn_outputs: usize) -> DriverConfig {
        DriverConfig {
            forward_outputs,
            turn_outputs,
            optim: OptimConfig {
                population_size: 4,
                optimizer: OptimizerConfig {
                    lower_bound: gain,
                    upper_bound: gain,
                    ..OptimizerConfig::default()
                },
                ..OptimConfig::default()
            },
            ..DriverConfig::default()
        }
    }

    /// A network with one input whose outputs are the passed constants.
    fn constant_outputs(outputs: &[f64]) -> NeuralNetwork {
        let mut network = NeuralNetwork::from_layers(&[1, outputs.len()]).unwrap();
        let bias: Vec<bool> = network.nodes().iter().map(|n| n.is_bias()).collect();
        let output_ids = network.layers()[1].node_ids().to_vec();
        for link in network.links_mut() {
            let gain = if bias[link.from()] {
                let position = output_ids.iter().position(|&id| id == link.to()).unwrap();
                outputs[position]
            } else {
                0.0
            };
            link.set_gain(gain);
        }
        network
    }

    fn single_sensor(forward_outputs: usize, turn_outputs: usize) -> DriverConfig {
        DriverConfig {
            forward_outputs,
            turn_outputs,
            car: CarConfig {
                sensors: vec![SensorMount::front(1.0, 0.0)],
                ..CarConfig::default()
            },
            optim: OptimConfig {
                population_size: 2,
                ..OptimConfig::default()
            },
            ..DriverConfig::default()
        }
    }

    #[test]
    fn default_topology() {
        let driver = Driver::new(DriverConfig::default(), tracks(), None).unwrap();
        assert_eq!(driver.network().size_inputs(), 7);
        assert_eq!(driver.network().size_outputs(), 20);
        assert_eq!(driver.config().step_budget(), 30_000);
        assert_eq!(driver.mode(), Mode::Optimizing);

        let config = DriverConfig {
            include_inverse_sensors: true,
            ..DriverConfig::default()
        };
        let driver = Driver::new(config, tracks(), None).unwrap();
        assert_eq!(driver.network().size_inputs(), 14);
    }

    #[test]
    fn requires_tracks() {
        assert!(matches!(
            Driver::new(DriverConfig::default(), vec![], None),
            Err(DriverError::NoTracks)
        ));
    }

    #[test]
    fn car_starts_at_track_start() {
        let mut driver = Driver::new(DriverConfig::default(), tracks(), None).unwrap();
        let (x, y, rotation) = driver.track().start_pose();
        assert_eq!((driver.car().x(), driver.car().y()), (x, y));
        assert_eq!(driver.car().rotation(), rotation);
        assert!(driver.car().sensor(0).unwrap().distance > 0.0);

        assert_eq!(
            driver.set_track(2),
            Err(DriverError::Track(TrackError::TrackIndexOutOfRange {
                index: 2,
                count: 2
            }))
        );
        driver.set_track(1).unwrap();
        assert_eq!(driver.track_index(), 1);
        let (x, y, _) = driver.track().start_pose();
        assert_eq!((driver.car().x(), driver.car().y()), (x, y));
    }

    #[test]
    fn mode_changes() {
        let mut driver = Driver::new(DriverConfig::default(), tracks(), None).unwrap();
        assert!(!driver.set_mode(Mode::Optimizing));
        assert!(!driver.set_mode(Mode::ReplayFile));
        assert_eq!(driver.mode(), Mode::Optimizing);
        assert!(driver.set_mode(Mode::ReplayBest));
        assert_eq!(driver.mode(), Mode::ReplayBest);
    }

    #[test]
    fn mismatched_file_network_is_discarded() {
        let network = NeuralNetwork::from_layers(&[3, 2]).unwrap();
        let mut driver =
            Driver::new(DriverConfig::default(), tracks(), Some(network)).unwrap();
        assert!(driver.file_network().is_none());
        assert!(!driver.set_mode(Mode::ReplayFile));
    }

    #[test]
    fn outputs_are_decoded_with_alternating_signs() {
        let network = constant_outputs(&[0.2, 0.6, -0.4, 0.1]);
        let mut driver = Driver::new(single_sensor(2, 2), tracks(), Some(network)).unwrap();
        assert!(driver.set_mode(Mode::ReplayFile));
        assert_eq!(driver.step().unwrap(), None);
        assert!((driver.input_forward() - 0.2).abs() < 1e-12);
        assert!((driver.input_right() - 0.25).abs() < 1e-12);
        assert_eq!(driver.car().step_count(), 1);
    }

    #[test]
    fn small_inputs_read_as_zero() {
        let network = constant_outputs(&[0.0004, 0.0, 0.3, 0.0]);
        let mut driver = Driver::new(single_sensor(2, 2), tracks(), Some(network)).unwrap();
        driver.set_mode(Mode::ReplayFile);
        driver.step().unwrap();
        assert_eq!(driver.input_forward(), 0.0);
        assert!((driver.input_right() + 0.15).abs() < 1e-12);
    }

    #[test]
    fn idle_designs_are_stuck() {
        let mut driver = Driver::new(constant_gains(0.0, 10, 10), tracks(), None).unwrap();
        let report = driver.step().unwrap().unwrap();
        assert_eq!(report.end, EpisodeEnd::Stuck);
        assert_eq!(report.steps, 1);
        assert_eq!(report.fitness, 0.0);
        assert!(!report.improved);
        assert_eq!(report.design_index, 0);
        assert_eq!(driver.design_index(), 1);
        assert_eq!(driver.car().step_count(), 0);
    }

    #[test]
    fn reversing_designs_are_stuck() {
        // Equal outputs cancel in a two-output turn sum, so the
        // car backs straight down the road.
        let mut driver = Driver::new(constant_gains(1.0, 1, 2), tracks(), None).unwrap();
        let mut report = None;
        for _ in 0..100 {
            report = driver.step().unwrap();
            if report.is_some() {
                break;
            }
        }
        let report = report.unwrap();
        assert_eq!(report.end, EpisodeEnd::Stuck);
        assert!(report.fitness < driver.config().stuck_distance_threshold);
        assert_eq!(report.steps, 52);
        assert!(!report.improved);
    }

    #[test]
    fn episodes_end_at_the_step_budget() {
        let config = DriverConfig {
            base_frequency: 5,
            step_budget_factor: 1,
            ..constant_gains(1.0, 1, 1)
        };
        let mut driver = Driver::new(config, tracks(), None).unwrap();
        let mut report = None;
        for _ in 0..10 {
            report = driver.step().unwrap();
            if report.is_some() {
                break;
            }
        }
        let report = report.unwrap();
        assert_eq!(report.end, EpisodeEnd::StepBudget);
        assert_eq!(report.steps, 6);
        // Positive outputs at even positions drive the car backwards.
        assert!(report.fitness < 0.0);
    }

    #[test]
    fn replay_never_reports() {
        let mut driver = Driver::new(constant_gains(0.0, 10, 10), tracks(), None).unwrap();
        driver.set_mode(Mode::ReplayBest);
        for _ in 0..5 {
            assert_eq!(driver.step().unwrap(), None);
        }
        assert_eq!(driver.design_index(), 0);
        assert_eq!(driver.car().step_count(), 5);
    }

    #[test]
    fn run_generations_counts_episodes() {
        let mut driver = Driver::new(constant_gains(0.0, 10, 10), tracks(), None).unwrap();
        driver.set_mode(Mode::ReplayBest);
        let mut designs = vec![];
        driver
            .run_generations(2, |report| designs.push(report.design_index))
            .unwrap();
        assert_eq!(driver.mode(), Mode::Optimizing);
        assert_eq!(driver.generation(), 2);
        assert_eq!(designs, vec![0, 1, 2, 3, 0, 1, 2, 3]);
        assert_eq!(driver.optim().logger().iter().count(), 2);
    }
}

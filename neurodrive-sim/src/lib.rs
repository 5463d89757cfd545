//! Simulation side of neurodrive: tile tracks, a car with distance
//! sensors, and the loop that evolves a neural-network driver.
//!
//! # Example usage: training on a built-in track
//! ```
//! use neurodrive_sim::states::{Driver, DriverConfig, OptimConfig};
//! use neurodrive_sim::tracks::{layouts, RoadGrid};
//!
//! let config = DriverConfig {
//!     optim: OptimConfig {
//!         population_size: 5,
//!         ..OptimConfig::default()
//!     },
//!     ..DriverConfig::default()
//! };
//! let tracks = layouts::builtin()
//!     .iter()
//!     .map(RoadGrid::from_layout)
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//!
//! let mut driver = Driver::new(config, tracks, None).unwrap();
//! let mut best = 0.0_f64;
//! driver
//!     .run_generations(2, |report| best = best.max(report.fitness))
//!     .unwrap();
//!
//! assert_eq!(driver.generation(), 2);
//! assert_eq!(driver.best_fitness(), best);
//! ```
pub mod cars;
pub mod states;
pub mod tracks;

pub use cars::CarError;
pub use states::DriverError;
pub use tracks::TrackError;

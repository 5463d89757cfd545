//! Training and replay orchestration.
//!
//! [`OptimState`] pairs a network with the optimizer evolving its
//! gains and keeps the best network found. [`Driver`] runs the
//! per-tick loop on top of it: it feeds sensor readings to the
//! selected network, steers the car with the decoded outputs and
//! scores each design by the distance its car travels.
mod driver;
mod errors;
mod optim_state;

pub use driver::{Driver, DriverConfig, EpisodeEnd, EpisodeReport, Mode};
pub use errors::DriverError;
pub use optim_state::{OptimConfig, OptimPhase, OptimState};

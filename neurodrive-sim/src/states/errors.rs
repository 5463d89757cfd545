use crate::cars::CarError;
use crate::tracks::TrackError;

use neurodrive::OptimizerError;
use neurodrive_nn::networks::{NetworkError, TopologyError};

use std::error::Error;
use std::fmt;

/// An error type indicating a failure to
/// build or run a training session.
#[derive(Clone, Debug, PartialEq)]
pub enum DriverError {
    /// The controller network could not be built.
    Topology(TopologyError),
    /// The optimizer rejected its configuration.
    Optimizer(OptimizerError),
    /// The controller network rejected an evaluation.
    Network(NetworkError),
    /// The car rejected its configuration.
    Car(CarError),
    /// A track was unusable or out of range.
    Track(TrackError),
    /// A session needs at least one track.
    NoTracks,
    /// A network's input or output count did not match the car.
    TopologyMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(e) => write!(f, "invalid controller topology: {}", e),
            Self::Optimizer(e) => write!(f, "invalid optimizer setup: {}", e),
            Self::Network(e) => write!(f, "controller evaluation failed: {}", e),
            Self::Car(e) => write!(f, "invalid car: {}", e),
            Self::Track(e) => write!(f, "invalid track: {}", e),
            Self::NoTracks => write!(f, "no tracks to drive on"),
            Self::TopologyMismatch { expected, found } => write!(
                f,
                "network has {} inputs and {} outputs, expected {} and {}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl Error for DriverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Topology(e) => Some(e),
            Self::Optimizer(e) => Some(e),
            Self::Network(e) => Some(e),
            Self::Car(e) => Some(e),
            Self::Track(e) => Some(e),
            Self::NoTracks | Self::TopologyMismatch { .. } => None,
        }
    }
}

impl From<TopologyError> for DriverError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}

impl From<OptimizerError> for DriverError {
    fn from(e: OptimizerError) -> Self {
        Self::Optimizer(e)
    }
}

impl From<NetworkError> for DriverError {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

impl From<CarError> for DriverError {
    fn from(e: CarError) -> Self {
        Self::Car(e)
    }
}

impl From<TrackError> for DriverError {
    fn from(e: TrackError) -> Self {
        Self::Track(e)
    }
}

use std::error::Error;
use std::fmt;

/// An error type indicating a failed
/// optimizer construction or access.
#[derive(Clone, Debug, PartialEq)]
pub enum OptimizerError {
    /// A construction parameter was unusable.
    /// Contains a description of the parameter.
    InvalidArgument(&'static str),
    /// A design index was outside of the population.
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The population size.
        size: usize,
    },
    /// A seeding design's length did not match
    /// the optimizer's design length.
    DesignLengthMismatch {
        /// Length of the optimizer's designs.
        expected: usize,
        /// Length of the passed design.
        found: usize,
    },
}

impl fmt::Display for OptimizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(what) => write!(f, "invalid optimizer argument: {}", what),
            Self::IndexOutOfRange { index, size } => write!(
                f,
                "design index {} out of range for population of size {}",
                index, size
            ),
            Self::DesignLengthMismatch { expected, found } => write!(
                f,
                "design of length {} does not match optimizer design length {}",
                found, expected
            ),
        }
    }
}

impl Error for OptimizerError {}

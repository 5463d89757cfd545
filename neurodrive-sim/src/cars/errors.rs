use std::error::Error;
use std::fmt;

/// An error type indicating an unusable
/// car configuration or a bad sensor access.
#[derive(Clone, Debug, PartialEq)]
pub enum CarError {
    /// A configuration value was unusable.
    /// Contains the field name.
    InvalidConfig(&'static str),
    /// The sensor at the contained index has
    /// a zero-length or non-finite direction.
    DegenerateSensor(usize),
    /// A sensor index lies outside of the sensor array.
    IndexOutOfRange { index: usize, count: usize },
}

impl fmt::Display for CarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(field) => {
                write!(f, "car configuration field {} must be positive", field)
            }
            Self::DegenerateSensor(index) => {
                write!(f, "sensor {} has no usable direction", index)
            }
            Self::IndexOutOfRange { index, count } => {
                write!(f, "sensor index {} out of range for {} sensors", index, count)
            }
        }
    }
}

impl Error for CarError {}

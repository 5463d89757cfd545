use std::error::Error;
use std::fmt;

/// An error type indicating an invalid
/// track construction or selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackError {
    /// The grid was given a zero dimension.
    EmptyGrid,
    /// A cell position lies outside of the grid.
    CellOutOfRange {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },
    /// A track index does not refer to a loaded track.
    TrackIndexOutOfRange { index: usize, count: usize },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "track grid must have at least one row and column"),
            Self::CellOutOfRange {
                row,
                col,
                width,
                height,
            } => write!(
                f,
                "cell ({}, {}) outside of {}x{} grid",
                row, col, width, height
            ),
            Self::TrackIndexOutOfRange { index, count } => {
                write!(f, "track index {} out of range for {} tracks", index, count)
            }
        }
    }
}

impl Error for TrackError {}

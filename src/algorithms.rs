use std::fmt;

mod k_means;

pub use k_means::Init;
pub use k_means::KMeans;
pub use k_means::Metadata as KMeansMetadata;

/// Common errors thrown by algorithms.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The algorithm was given no point at all.
    EmptyInput,

    /// A setting of the algorithm is out of its domain (e.g. asking for zero
    /// groups, or more groups than there are points).
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },

    /// The point at the given index has a NaN or infinite coordinate.
    InvalidPoint { index: usize },

    /// Input sets don't have matching lengths.
    InputLenMismatch { expected: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "no point to group"),
            Error::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter {name:?}: {reason}")
            }
            Error::InvalidPoint { index } => {
                write!(f, "point #{index} has a non-finite coordinate")
            }
            Error::InputLenMismatch { expected, actual } => write!(
                f,
                "input sets don't have the same length (expected {expected} items, got {actual})",
            ),
        }
    }
}

impl std::error::Error for Error {}

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Invalid-argument errors raised at the tree boundary. None of them leaves the tree
/// modified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid coordinate {value} on axis {axis}")]
    InvalidCoordinate { axis: usize, value: f64 },

    #[error("envelope covers no point")]
    EmptyEnvelope,

    #[error("node capacity must be at least 2, got {0}")]
    InvalidCapacity(u32),

    #[error("split requires at least two elements, got {0}")]
    SplitUnderflow(usize),

    #[error("branch grafting requires at least two entries, got {0}")]
    GraftUnderflow(usize),
}

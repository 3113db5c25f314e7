//! Error types for the array model and wire codec.

use thiserror::Error;

/// Errors raised while building, indexing, converting or decoding arrays.
///
/// Every variant is a local, synchronous failure. Nothing in the core
/// retries, and a failed operation leaves previously valid state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    /// A shape vector contained a negative dimension.
    #[error("Invalid shape {shape:?}: dimension {axis} is negative")]
    Shape {
        /// The offending shape, as supplied.
        shape: Vec<i64>,
        /// Axis of the first negative entry.
        axis: usize,
    },

    /// A shape describes more elements than an array may hold.
    #[error("Invalid shape {shape:?}: more than {limit} elements")]
    ShapeTooLarge { shape: Vec<usize>, limit: usize },

    /// An index tuple has a different length than the array's rank.
    #[error("Rank mismatch: index has {got} components, array has rank {rank}")]
    RankMismatch { rank: usize, got: usize },

    /// An index component falls outside its dimension.
    #[error("Index {index:?} out of range for shape {shape:?} (axis {axis}, origin {origin})")]
    IndexOutOfRange {
        index: Vec<i64>,
        shape: Vec<usize>,
        axis: usize,
        origin: i64,
    },

    /// The value has no array representation.
    #[error("Type not supported: {0}")]
    UnsupportedType(String),

    /// The wire text is not JSON, or not an array where one was expected.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ArrayError {
    fn from(err: serde_json::Error) -> Self {
        ArrayError::Decode(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArrayError>;

/// Crate-level error type for the sensei motion comparison engine.
///
/// Only precondition violations are errors. "Not enough data" outcomes are
/// reported through sentinel values in the result types instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two vectors (or two vector series) have different dimensionality.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A named reference pose does not exist in the store.
    #[error("unknown reference pose `{0}`")]
    UnknownPose(String),
}

/// Convenience Result type for sensei operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the edge detection pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EdgeError {
    /// Malformed grid or kernel: empty, ragged, even-sized, or non-positive parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Threshold ordering/range violations, or clustering parameters out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A numeric step could not produce a result.
    #[error("computation failure: {0}")]
    ComputationFailure(String),
}

pub type Result<T> = std::result::Result<T, EdgeError>;

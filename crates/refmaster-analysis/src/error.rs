//! Error types for signal analysis.

use refmaster_core::BufferError;
use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised while analyzing a signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The signal is empty, malformed, or contains NaN/infinite samples.
    #[error("invalid signal: {0}")]
    InvalidSignal(#[from] BufferError),

    /// The loudness meter rejected the signal layout.
    #[error("loudness measurement failed: {0}")]
    Meter(String),
}

impl From<ebur128::Error> for AnalysisError {
    fn from(err: ebur128::Error) -> Self {
        Self::Meter(format!("{err:?}"))
    }
}

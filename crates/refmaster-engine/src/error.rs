//! Error types for mastering runs.

use refmaster_analysis::AnalysisError;
use refmaster_core::BufferError;
use thiserror::Error;

/// Result type for mastering operations.
pub type Result<T> = std::result::Result<T, MasteringError>;

/// Errors that abort a mastering run.
///
/// Failing to reach the loudness target is not an error; it is reported as
/// [`ConvergencePhase::IterationLimit`](crate::ConvergencePhase::IterationLimit)
/// in the diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MasteringError {
    /// Empty, malformed or non-finite input.
    #[error("invalid signal: {0}")]
    InvalidSignal(#[from] BufferError),

    /// Target and reference differ in sample rate or channel count.
    #[error(
        "reference format {reference_rate} Hz/{reference_channels} ch does not match target {target_rate} Hz/{target_channels} ch"
    )]
    FormatMismatch {
        /// Target sample rate.
        target_rate: u32,
        /// Target channel count.
        target_channels: u16,
        /// Reference sample rate.
        reference_rate: u32,
        /// Reference channel count.
        reference_channels: u16,
    },

    /// Only mono and stereo material can be mastered.
    #[error("unsupported channel count {0}: expected 1 or 2")]
    UnsupportedChannels(u16),

    /// Band spectra computed over different band layouts.
    #[error("band layouts differ: target has {target} bands, reference has {reference}")]
    BandLayoutMismatch {
        /// Target band count.
        target: usize,
        /// Reference band count.
        reference: usize,
    },

    /// The loudness meter rejected the signal.
    #[error("loudness measurement failed: {0}")]
    Meter(String),
}

impl From<AnalysisError> for MasteringError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidSignal(source) => Self::InvalidSignal(source),
            AnalysisError::Meter(msg) => Self::Meter(msg),
        }
    }
}

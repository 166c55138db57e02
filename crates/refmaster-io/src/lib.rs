//! Audio file I/O for refmaster.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] move whole
//!   [`SampleBuffer`](refmaster_core::SampleBuffer)s to and from disk, keeping
//!   every channel
//! - **Format conforming**: [`conform`] resamples and remixes a buffer to a
//!   given rate and channel count, so a reference can be compared with a
//!   target
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use refmaster_io::{conform, read_wav, write_wav};
//!
//! let (target, spec) = read_wav("mix.wav")?;
//! let (reference, _) = read_wav("reference.wav")?;
//! let reference = conform(&reference, target.sample_rate(), target.channels())?;
//! write_wav("reference-48k.wav", &reference, spec.bits_per_sample)?;
//! # Ok::<(), refmaster_io::Error>(())
//! ```

mod conform;
mod wav;

pub use conform::{conform, remix, resample};
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

use refmaster_core::BufferError;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Only mono and stereo material can be read or conformed.
    #[error("Unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannels(u16),

    /// Output bit depth other than 16, 24 or 32.
    #[error("Unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// Decoded data does not form a valid buffer.
    #[error("Invalid audio data: {0}")]
    InvalidBuffer(#[from] BufferError),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

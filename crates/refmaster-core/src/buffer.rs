//! Immutable interleaved sample buffers.
//!
//! A [`SampleBuffer`] carries interleaved `f32` samples together with their
//! sample rate and channel count. Buffers are never mutated after
//! construction: every processing stage reads one buffer and produces a new
//! one via [`SampleBuffer::with_samples`] or [`SampleBuffer::map`].
//!
//! # Layout
//!
//! ```text
//! stereo: [L0, R0, L1, R1, L2, R2, ...]
//! mono:   [M0, M1, M2, ...]
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::fmt;

/// Errors raised when constructing or validating a [`SampleBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Sample rate of zero.
    ZeroSampleRate,
    /// Channel count of zero.
    ZeroChannels,
    /// Sample count is not a whole number of frames.
    RaggedFrames {
        /// Total number of samples supplied.
        len: usize,
        /// Channel count the samples were meant to interleave.
        channels: u16,
    },
    /// The buffer holds no samples.
    Empty,
    /// A sample is NaN or infinite.
    NonFinite {
        /// Interleaved index of the first offending sample.
        index: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::ZeroSampleRate => write!(f, "sample rate must be non-zero"),
            BufferError::ZeroChannels => write!(f, "channel count must be non-zero"),
            BufferError::RaggedFrames { len, channels } => write!(
                f,
                "{len} samples do not divide into frames of {channels} channel(s)"
            ),
            BufferError::Empty => write!(f, "buffer is empty"),
            BufferError::NonFinite { index } => {
                write!(f, "non-finite sample at index {index}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BufferError {}

/// Immutable interleaved audio buffer.
///
/// # Example
///
/// ```rust
/// use refmaster_core::SampleBuffer;
///
/// let stereo = SampleBuffer::new(vec![0.5, -0.5, 0.25, -0.25], 48000, 2).unwrap();
/// assert_eq!(stereo.frames(), 2);
///
/// let quieter = stereo.map(|s| s * 0.5);
/// assert_eq!(quieter.samples(), &[0.25, -0.25, 0.125, -0.125]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    /// Create a buffer from interleaved samples.
    ///
    /// Only the layout is checked here; use [`validate_signal`](Self::validate_signal)
    /// to reject empty or non-finite audio.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self, BufferError> {
        if sample_rate == 0 {
            return Err(BufferError::ZeroSampleRate);
        }
        if channels == 0 {
            return Err(BufferError::ZeroChannels);
        }
        if samples.len() % channels as usize != 0 {
            return Err(BufferError::RaggedFrames {
                len: samples.len(),
                channels,
            });
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Create a mono buffer.
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, BufferError> {
        Self::new(samples, sample_rate, 1)
    }

    /// Interleave separate channel vectors into one buffer.
    ///
    /// Channels shorter than the longest one are zero-padded.
    pub fn from_planar(planes: &[Vec<f32>], sample_rate: u32) -> Result<Self, BufferError> {
        let channels = u16::try_from(planes.len()).map_err(|_| BufferError::ZeroChannels)?;
        let frames = planes.iter().map(Vec::len).max().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * planes.len());
        for frame in 0..frames {
            for plane in planes {
                samples.push(plane.get(frame).copied().unwrap_or(0.0));
            }
        }
        Self::new(samples, sample_rate, channels)
    }

    /// A new buffer with the same rate and layout holding `samples`.
    pub fn with_samples(&self, samples: Vec<f32>) -> Result<Self, BufferError> {
        Self::new(samples, self.sample_rate, self.channels)
    }

    /// A new buffer with every sample passed through `f`.
    pub fn map(&self, f: impl FnMut(f32) -> f32) -> Self {
        Self {
            samples: self.samples.iter().copied().map(f).collect(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// A new buffer in the same format built by running `f` over a copy of
    /// the samples.
    ///
    /// The copy may grow or shrink inside `f`; it is truncated or zero-padded
    /// back to the original length afterwards.
    pub fn transformed(&self, f: impl FnOnce(&mut Vec<f32>)) -> Self {
        let len = self.samples.len();
        let mut samples = self.samples.clone();
        f(&mut samples);
        samples.resize(len, 0.0);
        Self {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, returning the interleaved samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// True when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// True when `other` shares this buffer's sample rate and channel count.
    pub fn same_format(&self, other: &SampleBuffer) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    /// De-interleave one channel.
    ///
    /// Returns an empty vector for an out-of-range channel index.
    pub fn channel(&self, index: usize) -> Vec<f32> {
        if index >= self.channels as usize {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Average all channels down to mono.
    pub fn to_mono(&self) -> Vec<f32> {
        let channels = self.channels as usize;
        if channels == 1 {
            return self.samples.clone();
        }
        let scale = 1.0 / channels as f32;
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale)
            .collect()
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }

    /// Reject empty buffers and buffers containing NaN or infinity.
    pub fn validate_signal(&self) -> Result<(), BufferError> {
        if self.samples.is_empty() {
            return Err(BufferError::Empty);
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(BufferError::NonFinite { index });
        }
        Ok(())
    }
}

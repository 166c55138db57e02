//! Refmaster Analysis - bounded numeric descriptors for audio signals
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`spectrum`] - Welch-averaged power spectra and spectral shape descriptors
//! - [`dynamics`] - RMS, peak and crest factor
//! - [`loudness`] - Gated integrated loudness (ITU-R BS.1770 / EBU R128)
//! - [`true_peak`] - Oversampled inter-sample peak measurement
//! - [`track`] - The per-track [`TrackAnalysis`] used by the mastering engine
//! - [`temporal`] - Short-time loudness, crest, band balance and transients
//!
//! ## Example
//!
//! ```rust
//! use refmaster_core::SampleBuffer;
//! use refmaster_analysis::analyze;
//!
//! let tone: Vec<f32> = (0..48000)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
//!     .collect();
//! let buffer = SampleBuffer::from_mono(tone, 48000).unwrap();
//! let analysis = analyze(&buffer).unwrap();
//! assert!(analysis.mid_band_energy > 0.9);
//! assert!(!analysis.is_silent);
//! ```

pub mod dynamics;
pub mod error;
pub mod fft;
pub mod loudness;
pub mod spectrum;
pub mod temporal;
pub mod track;
pub mod true_peak;

pub use error::AnalysisError;
pub use loudness::{LOUDNESS_FLOOR_LUFS, integrated_loudness};
pub use spectrum::Spectrum;
pub use temporal::{TemporalAnalysis, TemporalFrame, analyze_temporal};
pub use track::{TrackAnalysis, analyze};
pub use true_peak::true_peak_dbtp;

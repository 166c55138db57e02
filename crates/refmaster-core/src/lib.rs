//! Refmaster Core - DSP primitives and sample buffers for reference mastering
//!
//! This crate holds the building blocks shared by the analysis, effect and
//! engine crates. Everything here is allocation-light and `no_std` friendly;
//! the heavier spectral work lives in `refmaster-analysis`.
//!
//! # Core Abstractions
//!
//! ## Buffers
//!
//! - [`SampleBuffer`] - Immutable interleaved audio with rate and channel count
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for per-sample stereo-aware processors
//!
//! ## Filters & Dynamics
//!
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//! - [`EnvelopeFollower`] - Peak or RMS amplitude tracking
//!
//! ## Oversampling
//!
//! - [`Upsampler`] - Windowed-sinc polyphase interpolator used for true-peak
//!   metering
//!
//! ## Utilities
//!
//! - Level conversions: [`db_to_linear`], [`linear_to_db`]
//! - Channel helpers: [`mono_sum`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build for targets without the
//! standard library. `alloc` is still required for [`SampleBuffer`] and
//! [`Upsampler`].
//!
//! ```toml
//! [dependencies]
//! refmaster-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod buffer;
pub mod effect;
pub mod envelope;
pub mod math;
pub mod oversample;

pub use biquad::{
    Biquad, bandpass_coefficients, high_shelf_coefficients, highpass_coefficients,
    low_shelf_coefficients, lowpass_coefficients, peaking_eq_coefficients,
};
pub use buffer::{BufferError, SampleBuffer};
pub use effect::Effect;
pub use envelope::{DetectionMode, EnvelopeFollower};
pub use math::{db_to_linear, linear_to_db, ms_to_samples, mono_sum};
pub use oversample::{MAX_OVERSAMPLE_FACTOR, Upsampler};

//! Refmaster Effects - DSP stages of the mastering chain
//!
//! Every stage implements [`refmaster_core::Effect`] and keeps independent
//! state per channel (filters) or links both channels (dynamics):
//!
//! - [`HighPassFilter`] - Sub-sonic cleanup ahead of the EQ
//! - [`ShelfFilter`] - Low or high shelving EQ
//! - [`BellFilter`] - Peaking EQ band
//! - [`Compressor`] - RMS-detecting soft-knee compressor, stereo linked
//! - [`Gain`] - Static gain trim
//! - [`DeEsser`] - Split-band dynamic sibilance attenuation
//! - [`Limiter`] - Lookahead brickwall limiter
//!
//! ## Example
//!
//! ```rust
//! use refmaster_core::Effect;
//! use refmaster_effects::{Gain, Limiter};
//!
//! let mut gain = Gain::new(6.0);
//! let mut limiter = Limiter::new(48000.0);
//! limiter.set_ceiling_db(-1.0);
//!
//! let mut block = vec![0.5_f32; 960];
//! gain.process_interleaved(&mut block, 2);
//! limiter.process_interleaved(&mut block, 2);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compressor;
pub mod de_esser;
pub mod eq;
pub mod filter;
pub mod gain;
pub mod limiter;

pub use compressor::Compressor;
pub use de_esser::DeEsser;
pub use eq::{BellFilter, ShelfFilter, ShelfKind};
pub use filter::HighPassFilter;
pub use gain::Gain;
pub use limiter::Limiter;

//! Level and time conversions shared across the workspace.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`db_to_linear`] | dB → linear amplitude |
//! | [`linear_to_db`] | linear amplitude → dB (floored) |
//! | [`ms_to_samples`] | milliseconds → whole samples |
//! | [`mono_sum`] | average of a stereo pair |

use libm::{expf, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use refmaster_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below `1e-10` are floored to -200 dB so silence never
/// produces `-inf`.
///
/// # Example
/// ```rust
/// use refmaster_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.abs().max(1e-10)) * FACTOR
}

/// Convert a duration in milliseconds to a whole number of samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate) / 1000.0).max(0.0) as usize
}

/// Average a stereo pair down to mono.
#[inline]
pub fn mono_sum(left: f32, right: f32) -> f32 {
    (left + right) * 0.5
}

//! Gated integrated loudness (ITU-R BS.1770-4 / EBU R128).
//!
//! Measurement is delegated to the `ebur128` crate in integrated mode. The
//! meter reports `-inf` for silence and for programmes shorter than one
//! 400 ms gating block; those cases are floored at [`LOUDNESS_FLOOR_LUFS`] so
//! downstream arithmetic stays finite.

use ebur128::{EbuR128, Mode};
use refmaster_core::SampleBuffer;

use crate::error::Result;

/// Lowest loudness ever reported, in LUFS.
pub const LOUDNESS_FLOOR_LUFS: f64 = -70.0;

/// Integrated loudness of an interleaved buffer in LUFS.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidSignal`](crate::AnalysisError::InvalidSignal)
/// for empty or non-finite input and
/// [`AnalysisError::Meter`](crate::AnalysisError::Meter) when the meter
/// rejects the channel layout or rate.
pub fn integrated_loudness(signal: &SampleBuffer) -> Result<f64> {
    signal.validate_signal()?;
    let mut meter = EbuR128::new(u32::from(signal.channels()), signal.sample_rate(), Mode::I)?;
    meter.add_frames_f32(signal.samples())?;
    Ok(floor_loudness(meter.loudness_global()?))
}

fn floor_loudness(lufs: f64) -> f64 {
    if lufs.is_finite() {
        lufs.max(LOUDNESS_FLOOR_LUFS)
    } else {
        LOUDNESS_FLOOR_LUFS
    }
}

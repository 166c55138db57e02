//! Oversampled inter-sample peak measurement.

use refmaster_core::{SampleBuffer, Upsampler};

/// Default oversampling factor for true-peak metering.
pub const DEFAULT_OVERSAMPLE_FACTOR: usize = 4;

/// Largest absolute value of the band-limited reconstruction over all
/// channels, as a linear amplitude.
pub fn true_peak_linear(signal: &SampleBuffer, factor: usize) -> f32 {
    let upsampler = Upsampler::new(factor);
    (0..signal.channels() as usize)
        .map(|ch| upsampler.peak(&signal.channel(ch)))
        .fold(0.0_f32, f32::max)
}

/// True peak in dBTP. Silence reads `-inf`.
///
/// # Example
///
/// ```rust
/// use refmaster_core::SampleBuffer;
/// use refmaster_analysis::true_peak_dbtp;
///
/// let silence = SampleBuffer::from_mono(vec![0.0; 64], 48000).unwrap();
/// assert_eq!(true_peak_dbtp(&silence, 4), f32::NEG_INFINITY);
/// ```
pub fn true_peak_dbtp(signal: &SampleBuffer, factor: usize) -> f32 {
    let peak = true_peak_linear(signal, factor);
    if peak > 0.0 {
        20.0 * peak.log10()
    } else {
        f32::NEG_INFINITY
    }
}

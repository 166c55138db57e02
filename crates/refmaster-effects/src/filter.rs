//! Biquad high-pass filter.

use refmaster_core::{Biquad, Effect, highpass_coefficients};

/// Butterworth Q for a maximally flat passband.
const BUTTERWORTH_Q: f32 = 0.707;

/// Second-order high-pass filter with independent left/right state.
///
/// The mastering chain runs it at 30 Hz to strip rumble and DC before the
/// shelves and the compressor see the signal.
///
/// # Example
///
/// ```rust
/// use refmaster_effects::HighPassFilter;
/// use refmaster_core::Effect;
///
/// let mut hpf = HighPassFilter::new(48000.0, 30.0);
/// let out = hpf.process(0.5);
/// assert!(out.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct HighPassFilter {
    biquad: Biquad,
    biquad_r: Biquad,
    cutoff_hz: f32,
    q: f32,
    sample_rate: f32,
}

impl HighPassFilter {
    /// Create a Butterworth high-pass at `cutoff_hz`.
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        let mut filter = Self {
            biquad: Biquad::new(),
            biquad_r: Biquad::new(),
            cutoff_hz: cutoff_hz.max(1.0),
            q: BUTTERWORTH_Q,
            sample_rate,
        };
        filter.update_coefficients();
        filter
    }

    /// Set cutoff frequency in Hz (clamped to 1 Hz .. 0.49 × sample rate).
    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.min(self.sample_rate * 0.49).max(1.0);
        self.update_coefficients();
    }

    /// Cutoff frequency in Hz.
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Set resonance (clamped to 0.1..=10).
    pub fn set_q(&mut self, q: f32) {
        self.q = q.clamp(0.1, 10.0);
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        let coefficients = highpass_coefficients(self.cutoff_hz, self.q, self.sample_rate);
        self.biquad = Biquad::with_coefficients(coefficients);
        self.biquad_r = Biquad::with_coefficients(coefficients);
    }
}

impl Effect for HighPassFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.biquad.process(input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.biquad.process(left), self.biquad_r.process(right))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    fn reset(&mut self) {
        self.biquad.clear();
        self.biquad_r.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;
    use libm::sinf;

    fn sine_rms(filter: &mut HighPassFilter, freq: f32) -> f32 {
        let sr = 48000.0;
        let n = 48000;
        let mut sum = 0.0;
        for i in 0..n {
            let y = filter.process(sinf(2.0 * PI * freq * i as f32 / sr));
            if i >= n / 2 {
                sum += y * y;
            }
        }
        libm::sqrtf(sum / (n / 2) as f32)
    }

    #[test]
    fn test_blocks_dc() {
        let mut hpf = HighPassFilter::new(48000.0, 30.0);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = hpf.process(0.5);
        }
        assert!(out.abs() < 1e-3, "DC leak {out}");
    }

    #[test]
    fn test_passes_midrange() {
        let mut hpf = HighPassFilter::new(48000.0, 30.0);
        let rms = sine_rms(&mut hpf, 1000.0);
        assert!((rms - core::f32::consts::FRAC_1_SQRT_2).abs() < 0.02, "rms {rms}");
    }

    #[test]
    fn test_attenuates_below_cutoff() {
        let mut hpf = HighPassFilter::new(48000.0, 100.0);
        let rms = sine_rms(&mut hpf, 10.0);
        assert!(rms < 0.05, "rms {rms}");
    }

    #[test]
    fn test_stereo_channels_are_independent() {
        let mut hpf = HighPassFilter::new(48000.0, 30.0);
        for _ in 0..100 {
            let (_, r) = hpf.process_stereo(1.0, 0.0);
            assert_eq!(r, 0.0);
        }
    }
}

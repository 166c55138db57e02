//! Band-limited upsampling for inter-sample peak detection.
//!
//! Sample-peak metering misses overs that happen between samples once the
//! signal is reconstructed by a DAC. [`Upsampler`] interpolates `factor - 1`
//! extra points between every pair of input samples so a peak scan over the
//! result approximates the reconstructed waveform (ITU-R BS.1770 Annex 2).
//!
//! ## Filter
//!
//! Each output phase `p` (fractional offset `p / factor`) has its own FIR
//! kernel: a sinc centred on the fractional position, tapered by a Blackman
//! window spanning `HALF_TAPS` samples on either side and normalized to unity
//! DC gain. Phase 0 reduces to the identity, so original samples pass through
//! unchanged.
//!
//! ```text
//! h_p[k] = sinc(k - p/L) * blackman((k - p/L) / HALF_TAPS)
//! y[n*L + p] = sum_k x[n + k] * h_p[k],  k in -(HALF_TAPS-1) ..= HALF_TAPS
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Maximum supported oversampling factor.
pub const MAX_OVERSAMPLE_FACTOR: usize = 8;

/// Half-width of each polyphase kernel in input samples.
const HALF_TAPS: usize = 8;

/// Polyphase windowed-sinc interpolator.
///
/// # Example
///
/// ```rust
/// use refmaster_core::Upsampler;
///
/// let up = Upsampler::new(4);
/// let signal: Vec<f32> = (0..64).map(|i| (i as f32 * 0.7).sin() * 0.5).collect();
/// let dense = up.process(&signal);
/// assert_eq!(dense.len(), signal.len() * 4);
/// assert!(up.peak(&signal) >= 0.49);
/// ```
#[derive(Debug, Clone)]
pub struct Upsampler {
    factor: usize,
    /// `phases[p][k]` multiplies `x[n + k - (HALF_TAPS - 1)]`.
    phases: Vec<Vec<f32>>,
}

impl Upsampler {
    /// Create an upsampler. `factor` is clamped to `1..=MAX_OVERSAMPLE_FACTOR`.
    pub fn new(factor: usize) -> Self {
        let factor = factor.clamp(1, MAX_OVERSAMPLE_FACTOR);
        let phases = (0..factor)
            .map(|p| design_phase(p as f32 / factor as f32))
            .collect();
        Self { factor, phases }
    }

    /// Oversampling factor in use.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Interpolate a single channel, returning `input.len() * factor` samples.
    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        let mut output = Vec::with_capacity(input.len() * self.factor);
        for n in 0..input.len() {
            for phase in &self.phases {
                output.push(self.interpolate(input, n, phase));
            }
        }
        output
    }

    /// Largest absolute value of the interpolated signal, without
    /// materializing it.
    pub fn peak(&self, input: &[f32]) -> f32 {
        let mut peak = 0.0_f32;
        for n in 0..input.len() {
            for phase in &self.phases {
                peak = peak.max(self.interpolate(input, n, phase).abs());
            }
        }
        peak
    }

    #[inline]
    fn interpolate(&self, input: &[f32], n: usize, kernel: &[f32]) -> f32 {
        if self.factor == 1 {
            return input[n];
        }
        let mut acc = 0.0_f32;
        for (j, &h) in kernel.iter().enumerate() {
            // j maps to k = j - (HALF_TAPS - 1)
            let Some(index) = (n + j).checked_sub(HALF_TAPS - 1) else {
                continue;
            };
            if let Some(&x) = input.get(index) {
                acc += x * h;
            }
        }
        acc
    }
}

fn design_phase(fraction: f32) -> Vec<f32> {
    let span = HALF_TAPS as f32;
    let mut taps: Vec<f32> = (0..2 * HALF_TAPS)
        .map(|j| {
            let t = j as f32 - (span - 1.0) - fraction;
            let sinc = if t.abs() < 1e-6 {
                1.0
            } else {
                sinf(PI * t) / (PI * t)
            };
            let window = if t.abs() >= span {
                0.0
            } else {
                let x = PI * t / span;
                0.42 + 0.5 * cosf(x) + 0.08 * cosf(2.0 * x)
            };
            sinc * window
        })
        .collect();

    let sum: f32 = taps.iter().sum();
    if sum.abs() > 1e-9 {
        for tap in &mut taps {
            *tap /= sum;
        }
    }
    taps
}

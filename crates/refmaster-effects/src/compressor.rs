//! Program compressor with soft-knee characteristics.
//!
//! A feed-forward compressor tuned for bus and mastering use: the detector
//! runs in RMS mode so gain reduction follows program level rather than
//! individual transients.
//!
//! # Signal Flow
//!
//! ```text
//! Input → RMS Envelope → Gain Computer → Gain Reduction → Output
//! ```
//!
//! # Parameters
//!
//! | Parameter | Range | Description |
//! |-----------|-------|-------------|
//! | Threshold | -60 to 0 dB | Level where compression begins |
//! | Ratio | 1:1 to 20:1 | Compression strength |
//! | Attack | 0.1-100 ms | How fast gain reduction engages |
//! | Release | 10-1000 ms | How fast gain reduction releases |
//! | Knee | 0-12 dB | Width of the soft transition around threshold |

use refmaster_core::{DetectionMode, Effect, EnvelopeFollower, db_to_linear, linear_to_db};

/// Gain computer for calculating the compression curve.
#[derive(Debug, Clone)]
struct GainComputer {
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
}

impl GainComputer {
    #[inline]
    fn compute_gain_db(&self, input_db: f32) -> f32 {
        let overshoot = input_db - self.threshold_db;
        let slope = 1.0 - 1.0 / self.ratio;

        if overshoot <= -self.knee_db / 2.0 {
            0.0
        } else if overshoot > self.knee_db / 2.0 || self.knee_db <= 0.0 {
            -overshoot * slope
        } else {
            // Quadratic interpolation across the knee
            let x = overshoot + self.knee_db / 2.0;
            -slope * x * x / (2.0 * self.knee_db)
        }
    }
}

/// Dynamics compressor.
///
/// # Example
///
/// ```rust
/// use refmaster_effects::Compressor;
/// use refmaster_core::Effect;
///
/// let mut comp = Compressor::new(48000.0);
/// comp.set_threshold_db(-22.0);
/// comp.set_ratio(2.2);
/// comp.set_attack_ms(15.0);
/// comp.set_release_ms(120.0);
///
/// let output = comp.process(0.5);
/// assert!(output.abs() <= 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    envelope_follower: EnvelopeFollower,
    gain_computer: GainComputer,
    /// Last computed gain reduction in dB (always non-positive).
    last_gain_reduction_db: f32,
}

impl Compressor {
    /// Create a compressor at -18 dB, 4:1, 6 dB knee, 10/100 ms.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            envelope_follower: EnvelopeFollower::new(sample_rate).with_mode(DetectionMode::Rms),
            gain_computer: GainComputer {
                threshold_db: -18.0,
                ratio: 4.0,
                knee_db: 6.0,
            },
            last_gain_reduction_db: 0.0,
        }
    }

    /// Set threshold in dB.
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.gain_computer.threshold_db = threshold_db.clamp(-60.0, 0.0);
    }

    /// Threshold in dB.
    pub fn threshold_db(&self) -> f32 {
        self.gain_computer.threshold_db
    }

    /// Set compression ratio.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.gain_computer.ratio = ratio.clamp(1.0, 20.0);
    }

    /// Compression ratio.
    pub fn ratio(&self) -> f32 {
        self.gain_computer.ratio
    }

    /// Set attack time in milliseconds.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.envelope_follower
            .set_attack_ms(attack_ms.clamp(0.1, 100.0));
    }

    /// Set release time in milliseconds.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.envelope_follower
            .set_release_ms(release_ms.clamp(10.0, 1000.0));
    }

    /// Set knee width in dB.
    pub fn set_knee_db(&mut self, knee_db: f32) {
        self.gain_computer.knee_db = knee_db.clamp(0.0, 12.0);
    }

    /// Returns the last computed gain reduction in dB (always non-positive).
    pub fn gain_reduction_db(&self) -> f32 {
        self.last_gain_reduction_db
    }

    #[inline]
    fn gain_for(&mut self, detector: f32) -> f32 {
        let envelope = self.envelope_follower.process(detector);
        let gain_reduction_db = self.gain_computer.compute_gain_db(linear_to_db(envelope));
        self.last_gain_reduction_db = gain_reduction_db;
        db_to_linear(gain_reduction_db)
    }
}

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.gain_for(input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        // Linked: the detector sees the mean power of both channels so the
        // same gain lands on each side.
        let detector = libm::sqrtf((left * left + right * right) * 0.5);
        let gain = self.gain_for(detector);
        (left * gain, right * gain)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope_follower.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.envelope_follower.reset();
        self.last_gain_reduction_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_computer_curve() {
        let gc = GainComputer {
            threshold_db: -20.0,
            ratio: 4.0,
            knee_db: 0.0,
        };
        assert_eq!(gc.compute_gain_db(-30.0), 0.0);
        // 12 dB over at 4:1 leaves 3 dB over: 9 dB of reduction
        assert!((gc.compute_gain_db(-8.0) + 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_soft_knee_is_continuous() {
        let gc = GainComputer {
            threshold_db: -20.0,
            ratio: 4.0,
            knee_db: 6.0,
        };
        let below = gc.compute_gain_db(-23.0001);
        let at_lower = gc.compute_gain_db(-22.9999);
        assert!((below - at_lower).abs() < 1e-3);
        let inside = gc.compute_gain_db(-17.0001);
        let outside = gc.compute_gain_db(-16.9999);
        assert!((inside - outside).abs() < 1e-3);
    }

    #[test]
    fn test_quiet_signal_untouched() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(-10.0);
        for _ in 0..4800 {
            let y = comp.process(0.01);
            assert!((y - 0.01).abs() < 1e-6);
        }
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn test_loud_signal_is_reduced() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(-20.0);
        comp.set_ratio(4.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = comp.process(0.5);
        }
        assert!(out < 0.3, "output {out}");
        assert!(comp.gain_reduction_db() < -3.0);
    }

    #[test]
    fn test_stereo_link_applies_same_gain() {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(-20.0);
        let mut last = (0.0, 0.0);
        for _ in 0..4800 {
            last = comp.process_stereo(0.8, 0.2);
        }
        assert!((last.0 / 0.8 - last.1 / 0.2).abs() < 1e-5);
    }
}

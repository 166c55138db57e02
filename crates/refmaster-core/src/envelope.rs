//! Envelope follower for dynamics sidechains.
//!
//! Tracks the level of a signal with separate attack and release ballistics.
//! The compressor runs it in [`DetectionMode::Rms`] for program-level
//! detection; the de-esser uses [`DetectionMode::Peak`] on its band-passed
//! sidechain so short sibilants are caught.

use libm::{expf, sqrtf};

/// How the follower rectifies its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMode {
    /// Smooth the absolute value.
    #[default]
    Peak,
    /// Smooth the squared value and report its square root.
    Rms,
}

/// Attack/release envelope follower.
///
/// # Example
///
/// ```rust
/// use refmaster_core::{DetectionMode, EnvelopeFollower};
///
/// let mut env = EnvelopeFollower::with_times(48000.0, 15.0, 120.0)
///     .with_mode(DetectionMode::Rms);
/// for _ in 0..4800 {
///     env.process(0.5);
/// }
/// assert!((env.level() - 0.5).abs() < 0.05);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    /// Smoothed detector state (linear, or squared in RMS mode).
    state: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    mode: DetectionMode,
}

impl EnvelopeFollower {
    /// Create a peak follower with 10 ms attack and 100 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, 10.0, 100.0)
    }

    /// Create a peak follower with explicit attack and release times.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            state: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms: attack_ms.max(0.01),
            release_ms: release_ms.max(1.0),
            mode: DetectionMode::Peak,
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Switch the detection mode.
    pub fn with_mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self.state = 0.0;
        self
    }

    /// Set the attack time in milliseconds (minimum 0.01 ms).
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.01);
        self.recalculate_coefficients();
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Set the release time in milliseconds (minimum 1 ms).
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(1.0);
        self.recalculate_coefficients();
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Detection mode in use.
    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Update the sample rate and recompute coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Feed one sample and return the current level (always non-negative).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = match self.mode {
            DetectionMode::Peak => input.abs(),
            DetectionMode::Rms => input * input,
        };

        let coeff = if rectified > self.state {
            self.attack_coeff
        } else {
            self.release_coeff
        };

        // y[n] = coeff * y[n-1] + (1 - coeff) * x[n]
        self.state = coeff * self.state + (1.0 - coeff) * rectified;
        self.level()
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        match self.mode {
            DetectionMode::Peak => self.state,
            DetectionMode::Rms => sqrtf(self.state.max(0.0)),
        }
    }

    /// Reset the level to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        // coeff = exp(-1 / (time_ms * sample_rate / 1000))
        self.attack_coeff = expf(-1.0 / (self.attack_ms * self.sample_rate / 1000.0));
        self.release_coeff = expf(-1.0 / (self.release_ms * self.sample_rate / 1000.0));
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_attack() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 100.0);
        let mut level = 0.0;
        for _ in 0..500 {
            level = env.process(1.0);
        }
        assert!(level > 0.9, "envelope should rise, got {level}");
    }

    #[test]
    fn test_envelope_release() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 10.0);
        for _ in 0..500 {
            env.process(1.0);
        }
        let mut level = 1.0;
        for _ in 0..1000 {
            level = env.process(0.0);
        }
        // ~2 time constants: e^-2 ≈ 0.135
        assert!(level < 0.15, "envelope should fall, got {level}");
    }

    #[test]
    fn test_peak_rectifies_negative_input() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 100.0);
        assert!(env.process(-0.5) > 0.0);
    }

    #[test]
    fn test_rms_of_square_wave_matches_amplitude() {
        let mut env = EnvelopeFollower::with_times(48000.0, 5.0, 5.0).with_mode(DetectionMode::Rms);
        for i in 0..48000 {
            let x = if (i / 24) % 2 == 0 { 0.5 } else { -0.5 };
            env.process(x);
        }
        assert!((env.level() - 0.5).abs() < 0.02, "got {}", env.level());
    }

    #[test]
    fn test_reset() {
        let mut env = EnvelopeFollower::new(48000.0);
        for _ in 0..100 {
            env.process(1.0);
        }
        env.reset();
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn test_time_floors() {
        let mut env = EnvelopeFollower::new(48000.0);
        env.set_attack_ms(0.0);
        env.set_release_ms(0.0);
        assert!(env.attack_ms() > 0.0);
        assert!((env.release_ms() - 1.0).abs() < 1e-6);
    }
}

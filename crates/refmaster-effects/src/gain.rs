//! Static gain stage.

use refmaster_core::{Effect, db_to_linear};

/// Applies a fixed gain in dB to every sample.
///
/// # Example
///
/// ```rust
/// use refmaster_effects::Gain;
/// use refmaster_core::Effect;
///
/// let mut trim = Gain::new(-6.0206);
/// assert!((trim.process(1.0) - 0.5).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct Gain {
    gain_db: f32,
    linear: f32,
}

impl Gain {
    /// Create a gain stage. Non-finite values become 0 dB.
    pub fn new(gain_db: f32) -> Self {
        let gain_db = if gain_db.is_finite() { gain_db } else { 0.0 };
        Self {
            gain_db,
            linear: db_to_linear(gain_db),
        }
    }

    /// Gain in dB.
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }
}

impl Effect for Gain {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.linear
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (left * self.linear, right * self.linear)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

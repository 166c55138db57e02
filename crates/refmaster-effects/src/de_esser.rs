//! Split-band dynamic de-esser.
//!
//! A band-passed sidechain centred in the sibilance region drives a fast peak
//! detector. When the detector rises above the threshold, only the content
//! above the split frequency is attenuated, by up to `depth_db`.
//!
//! ```text
//!            ┌─ band-pass 7 kHz ─ peak envelope ─ gain computer ─┐
//! input ─────┤                                                    ▼
//!            └─ low-pass split ─┬─ low ─────────────────────── (+) ─ output
//!                               └─ high = input - low ── × gain ─┘
//! ```
//!
//! The split is complementary (`low + high == input`), so with no reduction
//! the stage is sample-exact transparent.

use refmaster_core::{
    Biquad, DetectionMode, Effect, EnvelopeFollower, bandpass_coefficients, db_to_linear,
    linear_to_db, lowpass_coefficients, mono_sum,
};

/// Sidechain band-pass centre (Hz).
const SIDECHAIN_HZ: f32 = 7000.0;
/// Sidechain band-pass Q; wide enough to cover roughly 5–10 kHz.
const SIDECHAIN_Q: f32 = 0.8;
/// Split frequency between the untouched and the attenuated band (Hz).
const SPLIT_HZ: f32 = 5000.0;
const SPLIT_Q: f32 = 0.707;
/// Detector ballistics (ms).
const DETECTOR_ATTACK_MS: f32 = 0.5;
const DETECTOR_RELEASE_MS: f32 = 60.0;
/// Gain smoothing ballistics (ms).
const GAIN_ATTACK_MS: f32 = 1.5;
const GAIN_RELEASE_MS: f32 = 80.0;

/// Split-band de-esser, stereo linked.
///
/// # Example
///
/// ```rust
/// use refmaster_effects::DeEsser;
/// use refmaster_core::Effect;
///
/// let mut de_esser = DeEsser::new(48000.0, -30.0, 4.0);
/// let (l, r) = de_esser.process_stereo(0.1, 0.1);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct DeEsser {
    sidechain: Biquad,
    split_l: Biquad,
    split_r: Biquad,
    detector: EnvelopeFollower,
    threshold_db: f32,
    depth_db: f32,
    gain: f32,
    gain_attack_coeff: f32,
    gain_release_coeff: f32,
    sample_rate: f32,
}

impl DeEsser {
    /// Create a de-esser triggering at `threshold_db` with at most `depth_db`
    /// of high-band attenuation.
    pub fn new(sample_rate: f32, threshold_db: f32, depth_db: f32) -> Self {
        let mut de_esser = Self {
            sidechain: Biquad::new(),
            split_l: Biquad::new(),
            split_r: Biquad::new(),
            detector: EnvelopeFollower::with_times(
                sample_rate,
                DETECTOR_ATTACK_MS,
                DETECTOR_RELEASE_MS,
            )
            .with_mode(DetectionMode::Peak),
            threshold_db: finite_or(threshold_db, 0.0).clamp(-60.0, 0.0),
            depth_db: finite_or(depth_db, 0.0).clamp(0.0, 24.0),
            gain: 1.0,
            gain_attack_coeff: 0.0,
            gain_release_coeff: 0.0,
            sample_rate,
        };
        de_esser.update_coefficients();
        de_esser
    }

    /// Trigger threshold in dB.
    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }

    /// Maximum attenuation in dB.
    pub fn depth_db(&self) -> f32 {
        self.depth_db
    }

    /// Current high-band attenuation in dB (always non-positive).
    pub fn gain_reduction_db(&self) -> f32 {
        linear_to_db(self.gain).min(0.0)
    }

    fn update_coefficients(&mut self) {
        let sr = self.sample_rate;
        self.sidechain = Biquad::with_coefficients(bandpass_coefficients(SIDECHAIN_HZ, SIDECHAIN_Q, sr));
        let split = lowpass_coefficients(SPLIT_HZ, SPLIT_Q, sr);
        self.split_l = Biquad::with_coefficients(split);
        self.split_r = Biquad::with_coefficients(split);
        self.detector.set_sample_rate(sr);
        self.gain_attack_coeff = libm::expf(-1.0 / (GAIN_ATTACK_MS * sr / 1000.0));
        self.gain_release_coeff = libm::expf(-1.0 / (GAIN_RELEASE_MS * sr / 1000.0));
    }

    #[inline]
    fn advance_gain(&mut self, detector_input: f32) -> f32 {
        let level = self.detector.process(self.sidechain.process(detector_input));
        let over_db = linear_to_db(level) - self.threshold_db;
        let reduction_db = over_db.clamp(0.0, self.depth_db);
        let target = db_to_linear(-reduction_db);

        let coeff = if target < self.gain {
            self.gain_attack_coeff
        } else {
            self.gain_release_coeff
        };
        self.gain = coeff * self.gain + (1.0 - coeff) * target;
        self.gain
    }
}

#[inline]
fn split_band(split: &mut Biquad, input: f32, gain: f32) -> f32 {
    let low = split.process(input);
    low + (input - low) * gain
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

impl Effect for DeEsser {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let gain = self.advance_gain(input);
        split_band(&mut self.split_l, input, gain)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let gain = self.advance_gain(mono_sum(left, right));
        (
            split_band(&mut self.split_l, left, gain),
            split_band(&mut self.split_r, right, gain),
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    fn reset(&mut self) {
        self.sidechain.clear();
        self.split_l.clear();
        self.split_r.clear();
        self.detector.reset();
        self.gain = 1.0;
    }
}

//! Shelving and peaking EQ bands.
//!
//! Both filters use RBJ cookbook designs from `refmaster-core` with one biquad
//! per channel. A gain of 0 dB produces unity coefficients, so a flat band is
//! transparent.

use refmaster_core::{
    Biquad, Effect, high_shelf_coefficients, low_shelf_coefficients, peaking_eq_coefficients,
};

/// Gain limit for a single EQ band in dB.
const MAX_BAND_GAIN_DB: f32 = 24.0;

/// Shelf slope. 0.707 gives the classic Butterworth-like knee.
const SHELF_Q: f32 = 0.707;

/// Which end of the spectrum a [`ShelfFilter`] acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfKind {
    /// Boost or cut below the corner.
    Low,
    /// Boost or cut above the corner.
    High,
}

/// Low or high shelving filter.
///
/// # Example
///
/// ```rust
/// use refmaster_effects::{ShelfFilter, ShelfKind};
///
/// let warm = ShelfFilter::new(48000.0, ShelfKind::Low, 125.0, 1.5);
/// assert_eq!(warm.kind(), ShelfKind::Low);
/// ```
#[derive(Debug, Clone)]
pub struct ShelfFilter {
    kind: ShelfKind,
    biquad: Biquad,
    biquad_r: Biquad,
    frequency_hz: f32,
    gain_db: f32,
    sample_rate: f32,
}

impl ShelfFilter {
    /// Create a shelf at `frequency_hz` with `gain_db` (clamped to ±24 dB).
    pub fn new(sample_rate: f32, kind: ShelfKind, frequency_hz: f32, gain_db: f32) -> Self {
        let mut filter = Self {
            kind,
            biquad: Biquad::new(),
            biquad_r: Biquad::new(),
            frequency_hz,
            gain_db: sanitize_gain(gain_db),
            sample_rate,
        };
        filter.update_coefficients();
        filter
    }

    /// Shelf type.
    pub fn kind(&self) -> ShelfKind {
        self.kind
    }

    /// Shelf gain in dB.
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Corner frequency in Hz.
    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    /// Set shelf gain in dB.
    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = sanitize_gain(gain_db);
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        let coefficients = match self.kind {
            ShelfKind::Low => {
                low_shelf_coefficients(self.frequency_hz, SHELF_Q, self.gain_db, self.sample_rate)
            }
            ShelfKind::High => {
                high_shelf_coefficients(self.frequency_hz, SHELF_Q, self.gain_db, self.sample_rate)
            }
        };
        self.biquad = Biquad::with_coefficients(coefficients);
        self.biquad_r = Biquad::with_coefficients(coefficients);
    }
}

impl Effect for ShelfFilter {
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

/// Peaking (bell) EQ band.
#[derive(Debug, Clone)]
pub struct BellFilter {
    biquad: Biquad,
    biquad_r: Biquad,
    frequency_hz: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
}

impl BellFilter {
    /// Create a bell at `frequency_hz` with bandwidth `q` and `gain_db`.
    pub fn new(sample_rate: f32, frequency_hz: f32, q: f32, gain_db: f32) -> Self {
        let mut filter = Self {
            biquad: Biquad::new(),
            biquad_r: Biquad::new(),
            frequency_hz,
            q: q.clamp(0.1, 20.0),
            gain_db: sanitize_gain(gain_db),
            sample_rate,
        };
        filter.update_coefficients();
        filter
    }

    /// Centre frequency in Hz.
    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    /// Band gain in dB.
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    fn update_coefficients(&mut self) {
        let coefficients =
            peaking_eq_coefficients(self.frequency_hz, self.q, self.gain_db, self.sample_rate);
        self.biquad = Biquad::with_coefficients(coefficients);
        self.biquad_r = Biquad::with_coefficients(coefficients);
    }
}

impl Effect for BellFilter {
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

fn sanitize_gain(gain_db: f32) -> f32 {
    if gain_db.is_finite() {
        gain_db.clamp(-MAX_BAND_GAIN_DB, MAX_BAND_GAIN_DB)
    } else {
        0.0
    }
}

//! Brickwall lookahead limiter with exponential release ballistics.
//!
//! # Algorithm
//!
//! 1. **Lookahead buffering**: audio is delayed by `L` samples. The detector
//!    sees the un-delayed input, so gain reduction is in place before a peak
//!    reaches the output.
//! 2. **Peak detection**: a monotonic deque keeps the maximum of the last
//!    `L + 1` detector values in amortized O(1) per sample. The window always
//!    contains the sample currently leaving the delay line.
//! 3. **Gain computation**: `target = ceiling / peak` when the window peak
//!    exceeds the ceiling, otherwise unity.
//! 4. **Gain smoothing**: reductions are applied instantly; recovery is a
//!    one-pole release toward the target. The smoothed gain never exceeds the
//!    target, so `|output| <= ceiling` holds for every sample.
//!
//! # Stereo Linking
//!
//! The detector uses `max(|L|, |R|)` so both channels receive identical gain
//! reduction and the stereo image does not shift.
//!
//! # Latency
//!
//! Output is delayed by [`latency_samples`](Effect::latency_samples). Offline
//! callers append that many zero frames and drop the same number from the
//! front of the output to realign.

#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;
#[cfg(feature = "std")]
use std::collections::VecDeque;

use libm::expf;
use refmaster_core::{Effect, db_to_linear, linear_to_db, ms_to_samples};

/// Upper bound on the lookahead window in milliseconds.
const MAX_LOOKAHEAD_MS: f32 = 20.0;

/// One-pole release coefficient: `exp(-1 / (release_ms * sr / 1000))`.
fn compute_release_coeff(release_ms: f32, sample_rate: f32) -> f32 {
    let samples = release_ms * sample_rate / 1000.0;
    if samples <= 0.0 {
        0.0
    } else {
        expf(-1.0 / samples)
    }
}

/// Brickwall lookahead limiter.
///
/// # Example
///
/// ```rust
/// use refmaster_effects::Limiter;
/// use refmaster_core::Effect;
///
/// let mut lim = Limiter::new(48000.0);
/// lim.set_ceiling_db(-1.0);
///
/// let ceiling = 10f32.powf(-1.0 / 20.0);
/// for _ in 0..2048 {
///     let (l, r) = lim.process_stereo(0.99, -0.99);
///     assert!(l.abs() <= ceiling + 1e-6 && r.abs() <= ceiling + 1e-6);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Limiter {
    sample_rate: f32,
    /// Linear ceiling.
    ceiling: f32,
    ceiling_db: f32,
    release_ms: f32,
    release_coeff: f32,
    lookahead_ms: f32,
    lookahead_samples: usize,

    delay_l: VecDeque<f32>,
    delay_r: VecDeque<f32>,

    /// Monotonic (decreasing) deque of `(sample_index, detector_level)`.
    window: VecDeque<(u64, f32)>,
    sample_index: u64,

    /// Smoothed linear gain applied to the delayed signal.
    gain: f32,
}

impl Limiter {
    /// Create a limiter with a -1 dB ceiling, 150 ms release and 5 ms lookahead.
    pub fn new(sample_rate: f32) -> Self {
        let mut limiter = Self {
            sample_rate,
            ceiling: db_to_linear(-1.0),
            ceiling_db: -1.0,
            release_ms: 150.0,
            release_coeff: compute_release_coeff(150.0, sample_rate),
            lookahead_ms: 5.0,
            lookahead_samples: 0,
            delay_l: VecDeque::new(),
            delay_r: VecDeque::new(),
            window: VecDeque::new(),
            sample_index: 0,
            gain: 1.0,
        };
        limiter.resize_lookahead();
        limiter
    }

    /// Set the output ceiling in dB (clamped to -30..=0 dB).
    pub fn set_ceiling_db(&mut self, ceiling_db: f32) {
        let ceiling_db = if ceiling_db.is_finite() {
            ceiling_db.clamp(-30.0, 0.0)
        } else {
            -1.0
        };
        self.ceiling_db = ceiling_db;
        self.ceiling = db_to_linear(ceiling_db);
    }

    /// Output ceiling in dB.
    pub fn ceiling_db(&self) -> f32 {
        self.ceiling_db
    }

    /// Set the release time in milliseconds (clamped to 1..=2000 ms).
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.clamp(1.0, 2000.0);
        self.release_coeff = compute_release_coeff(self.release_ms, self.sample_rate);
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Set the lookahead in milliseconds (clamped to 0..=20 ms).
    ///
    /// Changing the lookahead clears the delay line.
    pub fn set_lookahead_ms(&mut self, lookahead_ms: f32) {
        self.lookahead_ms = lookahead_ms.clamp(0.0, MAX_LOOKAHEAD_MS);
        self.resize_lookahead();
    }

    /// Lookahead in milliseconds.
    pub fn lookahead_ms(&self) -> f32 {
        self.lookahead_ms
    }

    /// Current gain reduction in dB (always non-positive).
    pub fn gain_reduction_db(&self) -> f32 {
        linear_to_db(self.gain).min(0.0)
    }

    fn resize_lookahead(&mut self) {
        self.lookahead_samples = ms_to_samples(self.lookahead_ms, self.sample_rate);
        self.reset();
    }

    #[inline]
    fn advance_gain(&mut self, detector: f32) -> f32 {
        let index = self.sample_index;
        self.sample_index += 1;

        while self.window.back().is_some_and(|&(_, level)| level <= detector) {
            self.window.pop_back();
        }
        self.window.push_back((index, detector));
        let oldest = index.saturating_sub(self.lookahead_samples as u64);
        while self.window.front().is_some_and(|&(i, _)| i < oldest) {
            self.window.pop_front();
        }

        let peak = self.window.front().map_or(0.0, |&(_, level)| level);
        let target = if peak > self.ceiling {
            self.ceiling / peak
        } else {
            1.0
        };

        if target < self.gain {
            self.gain = target;
        } else {
            self.gain = self.release_coeff * self.gain + (1.0 - self.release_coeff) * target;
        }
        self.gain
    }
}

#[inline]
fn delay(line: &mut VecDeque<f32>, input: f32) -> f32 {
    line.push_back(input);
    line.pop_front().unwrap_or(0.0)
}

impl Effect for Limiter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let gain = self.advance_gain(input.abs());
        let delayed = delay(&mut self.delay_l, input);
        (delayed * gain).clamp(-self.ceiling, self.ceiling)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let gain = self.advance_gain(left.abs().max(right.abs()));
        let l = delay(&mut self.delay_l, left);
        let r = delay(&mut self.delay_r, right);
        (
            (l * gain).clamp(-self.ceiling, self.ceiling),
            (r * gain).clamp(-self.ceiling, self.ceiling),
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.release_coeff = compute_release_coeff(self.release_ms, sample_rate);
        self.resize_lookahead();
    }

    fn reset(&mut self) {
        self.delay_l.clear();
        self.delay_l.resize(self.lookahead_samples, 0.0);
        self.delay_r.clear();
        self.delay_r.resize(self.lookahead_samples, 0.0);
        self.window.clear();
        self.sample_index = 0;
        self.gain = 1.0;
    }

    fn latency_samples(&self) -> usize {
        self.lookahead_samples
    }
}

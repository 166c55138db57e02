//! Biquad (bi-quadratic) filter structure.
//!
//! A generic second-order IIR section plus RBJ Audio EQ Cookbook coefficient
//! designs for the shapes the mastering chain needs: high-pass cleanup,
//! shelving EQ, peaking bells and band-pass sidechains.
//!
//! Every coefficient function returns `(b0, b1, b2, a0, a1, a2)`; pass the
//! tuple to [`Biquad::set_coefficients`] or [`Biquad::with_coefficients`].
//! Corner frequencies are pulled below Nyquist before the design is
//! evaluated so a 16 kHz shelf at a 32 kHz rate stays stable.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, sqrtf};

/// Normalized biquad coefficients in the order `(b0, b1, b2, a0, a1, a2)`.
pub type Coefficients = (f32, f32, f32, f32, f32, f32);

/// Highest corner frequency accepted, as a fraction of the sample rate.
const MAX_CORNER_RATIO: f32 = 0.49;

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    /// Input history: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output history: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Creates a biquad from a coefficient tuple.
    pub fn with_coefficients(coefficients: Coefficients) -> Self {
        let mut biquad = Self::new();
        let (b0, b1, b2, a0, a1, a2) = coefficients;
        biquad.set_coefficients(b0, b1, b2, a0, a1, a2);
        biquad
    }

    /// Sets the biquad coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the filter history without touching the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn omega(frequency: f32, sample_rate: f32) -> f32 {
    let corner = frequency.min(sample_rate * MAX_CORNER_RATIO).max(1.0e-3);
    2.0 * PI * corner / sample_rate
}

/// Low-pass coefficients (RBJ cookbook).
///
/// `q` of 0.707 gives a Butterworth response.
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let alpha = sinf(w) / (2.0 * q);

    let b0 = (1.0 - cos_w) / 2.0;
    let b1 = 1.0 - cos_w;
    let b2 = (1.0 - cos_w) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// High-pass coefficients (RBJ cookbook).
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let alpha = sinf(w) / (2.0 * q);

    let b0 = (1.0 + cos_w) / 2.0;
    let b1 = -(1.0 + cos_w);
    let b2 = (1.0 + cos_w) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Band-pass coefficients with constant 0 dB peak gain (RBJ cookbook).
pub fn bandpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let alpha = sinf(w) / (2.0 * q);

    let b0 = alpha;
    let b1 = 0.0;
    let b2 = -alpha;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_w;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Peaking (bell) EQ coefficients.
///
/// Boosts or cuts `gain_db` around `frequency` with bandwidth set by `q`.
pub fn peaking_eq_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let alpha = sinf(w) / (2.0 * q);

    let b0 = 1.0 + alpha * a;
    let b1 = -2.0 * cos_w;
    let b2 = 1.0 - alpha * a;
    let a0 = 1.0 + alpha / a;
    let a1 = -2.0 * cos_w;
    let a2 = 1.0 - alpha / a;

    (b0, b1, b2, a0, a1, a2)
}

/// Low-shelf coefficients.
///
/// Gain at DC is `gain_db`; gain at Nyquist is unity.
pub fn low_shelf_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * sinf(w) / (2.0 * q);

    let b0 = a * ((a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha);
    let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w);
    let b2 = a * ((a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha);
    let a0 = (a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha;
    let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_w);
    let a2 = (a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// High-shelf coefficients.
///
/// Gain at Nyquist is `gain_db`; gain at DC is unity.
pub fn high_shelf_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * sinf(w) / (2.0 * q);

    let b0 = a * ((a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha);
    let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w);
    let b2 = a * ((a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha);
    let a0 = (a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha;
    let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_w);
    let a2 = (a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha;

    (b0, b1, b2, a0, a1, a2)
}

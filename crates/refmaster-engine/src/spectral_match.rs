//! Per-band EQ corrections that move the target's tonal balance toward the
//! reference.
//!
//! Both signals are mixed to mono and RMS-normalized to the same level before
//! their spectra are compared, so the corrections describe tone rather than
//! loudness. The pipeline per band is:
//!
//! ```text
//! mean power ─ dB ─ (reference − target) ─ 3-tap smoothing ─ clamp ─ drop small
//! ```

use refmaster_analysis::spectrum::{ANALYSIS_FFT_SIZE, Spectrum};
use refmaster_config::AnalysisTuning;
use refmaster_core::{SampleBuffer, db_to_linear};
use serde::{Deserialize, Serialize};

use crate::decision::bounded;
use crate::error::{MasteringError, Result};

/// Power floor added before converting band power to dB.
const POWER_EPSILON: f32 = 1e-12;
/// Signals quieter than this are left un-normalized.
const NORMALIZE_MIN_RMS: f32 = 1e-12;

/// One EQ move: boost or cut `delta_db` around `center_hz`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBandCorrection {
    /// Geometric band centre in Hz.
    pub center_hz: f32,
    /// Signed correction in dB; positive boosts the target.
    pub delta_db: f32,
}

/// Mean spectral power per analysis band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSpectrum {
    centers_hz: Vec<f32>,
    power: Vec<f32>,
}

impl BandSpectrum {
    /// Geometric band centres, ascending.
    pub fn centers_hz(&self) -> &[f32] {
        &self.centers_hz
    }

    /// Mean power per band.
    pub fn power(&self) -> &[f32] {
        &self.power
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// True when the layout has no bands.
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    fn power_db(&self) -> impl Iterator<Item = f32> + '_ {
        self.power
            .iter()
            .map(|p| 10.0 * (p + POWER_EPSILON).log10())
    }
}

/// Scale `samples` so their RMS sits at `target_db`, clipping to ±1.
///
/// Near-silent input is returned unchanged.
pub fn normalize_rms(samples: &[f32], target_db: f32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    let rms = (sum_sq / samples.len() as f64).sqrt() as f32;
    if rms <= NORMALIZE_MIN_RMS {
        return samples.to_vec();
    }
    let gain = db_to_linear(target_db) / rms;
    samples.iter().map(|&s| (s * gain).clamp(-1.0, 1.0)).collect()
}

/// Band spectrum of `signal` over the profile's band layout.
///
/// The mono mixdown is normalized to `normalized_rms_db` and measured with a
/// Welch spectrum; each band reports the mean bin power over `[lo, hi)` and is
/// centred at `√(lo·hi)`. A band with no bins reports zero power.
pub fn band_spectrum(signal: &SampleBuffer, tuning: &AnalysisTuning) -> BandSpectrum {
    let normalized = normalize_rms(&signal.to_mono(), tuning.normalized_rms_db);
    let spectrum = Spectrum::welch(&normalized, signal.sample_rate() as f32, ANALYSIS_FFT_SIZE);

    let (centers_hz, power) = tuning
        .band_edges_hz
        .windows(2)
        .map(|pair| {
            let (lo, hi) = (pair[0], pair[1]);
            ((lo * hi).sqrt(), spectrum.band_mean_power(lo, hi))
        })
        .unzip();

    BandSpectrum { centers_hz, power }
}

/// Same-length convolution with a 3-tap kernel, zero padded at both ends.
fn smooth(values: &[f32], kernel: [f32; 3]) -> Vec<f32> {
    let at = |i: isize| -> f32 {
        usize::try_from(i)
            .ok()
            .and_then(|i| values.get(i))
            .copied()
            .unwrap_or(0.0)
    };
    (0..values.len() as isize)
        .map(|i| kernel[0] * at(i + 1) + kernel[1] * at(i) + kernel[2] * at(i - 1))
        .collect()
}

/// Corrections that move `target` toward `reference`, ordered by ascending
/// centre.
///
/// Every returned correction satisfies
/// `eq_min_correction_db <= |delta_db| <= eq_max_abs_db`. Identical spectra
/// yield an empty list.
///
/// # Errors
///
/// [`MasteringError::BandLayoutMismatch`] when the two spectra were computed
/// over different band layouts.
pub fn compute_band_corrections(
    target: &BandSpectrum,
    reference: &BandSpectrum,
    tuning: &AnalysisTuning,
) -> Result<Vec<EqBandCorrection>> {
    let same_layout = target.len() == reference.len()
        && target
            .centers_hz
            .iter()
            .zip(&reference.centers_hz)
            .all(|(a, b)| (a - b).abs() <= 1e-3 * a.abs().max(1.0));
    if !same_layout {
        return Err(MasteringError::BandLayoutMismatch {
            target: target.len(),
            reference: reference.len(),
        });
    }
    if target.is_empty() {
        return Ok(Vec::new());
    }

    let deltas: Vec<f32> = reference
        .power_db()
        .zip(target.power_db())
        .map(|(r, t)| r - t)
        .collect();
    let max_abs = tuning.eq_max_abs_db.abs();

    Ok(smooth(&deltas, tuning.smoothing_kernel)
        .into_iter()
        .zip(&target.centers_hz)
        .filter_map(|(delta, &center_hz)| {
            let delta_db = bounded(delta, 0.0, -max_abs, max_abs);
            (delta_db.abs() >= tuning.eq_min_correction_db && delta_db != 0.0)
                .then_some(EqBandCorrection { center_hz, delta_db })
        })
        .collect())
}

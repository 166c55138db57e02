//! Whole-track descriptors consumed by the mastering decision engine.

use refmaster_core::SampleBuffer;
use serde::{Deserialize, Serialize};

use crate::dynamics::{crest_factor_db, rms_db, to_db_floored};
use crate::error::Result;
use crate::loudness::integrated_loudness;
use crate::spectrum::{ANALYSIS_FFT_SIZE, Spectrum};

/// Upper edge of the low band (Hz).
pub const LOW_BAND_MAX_HZ: f32 = 200.0;
/// Lower edge of the high band (Hz).
pub const HIGH_BAND_MIN_HZ: f32 = 4000.0;
/// Sibilance region (Hz).
pub const SIBILANCE_BAND_HZ: (f32, f32) = (5000.0, 10000.0);
/// Cumulative magnitude fraction that defines the rolloff frequency.
pub const ROLLOFF_FRACTION: f32 = 0.85;
/// Absolute sample value treated as clipped.
pub const CLIP_THRESHOLD: f32 = 0.999;
/// RMS level at or below which a track counts as silent (dB).
pub const SILENCE_THRESHOLD_DB: f32 = -60.0;

/// Bounded numeric descriptors of one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAnalysis {
    /// RMS level of the mono mixdown in dB (floored at -96).
    pub rms_db: f32,
    /// Magnitude-weighted mean frequency in Hz.
    pub spectral_centroid_hz: f32,
    /// Frequency below which 85 % of the spectral magnitude lies.
    pub spectral_rolloff_hz: f32,
    /// Fraction of power below 200 Hz.
    pub low_band_energy: f32,
    /// Fraction of power between 200 Hz and 4 kHz.
    pub mid_band_energy: f32,
    /// Fraction of power at or above 4 kHz.
    pub high_band_energy: f32,
    /// Peak-to-RMS ratio of the mono mixdown in dB.
    pub crest_factor_db: f32,
    /// Fraction of power between 5 and 10 kHz.
    pub sibilance_ratio: f32,
    /// Any sample reaches ±0.999.
    pub is_clipping: bool,
    /// RMS at or below -60 dB.
    pub is_silent: bool,
    /// Gated integrated loudness in LUFS (floored at -70).
    pub integrated_lufs: f32,
    /// Largest absolute sample over all channels in dBFS (floored at -96).
    pub sample_peak_db: f32,
}

/// Analyze a signal.
///
/// Spectral and dynamics descriptors are computed on the channel-average
/// mixdown; clipping, sample peak and loudness look at every channel.
///
/// # Errors
///
/// [`AnalysisError::InvalidSignal`](crate::AnalysisError::InvalidSignal)
/// for empty input or NaN/infinite samples.
pub fn analyze(signal: &SampleBuffer) -> Result<TrackAnalysis> {
    signal.validate_signal()?;

    let mono = signal.to_mono();
    let sample_rate = signal.sample_rate() as f32;
    let spectrum = Spectrum::welch(&mono, sample_rate, ANALYSIS_FFT_SIZE);

    let rms_db = rms_db(&mono);
    let peak = signal.peak();

    Ok(TrackAnalysis {
        rms_db,
        spectral_centroid_hz: spectrum.centroid(),
        spectral_rolloff_hz: spectrum.rolloff(ROLLOFF_FRACTION),
        low_band_energy: spectrum.band_fraction(0.0, LOW_BAND_MAX_HZ),
        mid_band_energy: spectrum.band_fraction(LOW_BAND_MAX_HZ, HIGH_BAND_MIN_HZ),
        high_band_energy: spectrum.band_fraction(HIGH_BAND_MIN_HZ, f32::INFINITY),
        crest_factor_db: crest_factor_db(&mono),
        sibilance_ratio: spectrum.band_fraction(SIBILANCE_BAND_HZ.0, SIBILANCE_BAND_HZ.1),
        is_clipping: peak >= CLIP_THRESHOLD,
        is_silent: rms_db <= SILENCE_THRESHOLD_DB,
        integrated_lufs: integrated_loudness(signal)? as f32,
        sample_peak_db: to_db_floored(peak),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisError;
    use std::f64::consts::PI;

    fn sine(freq: f64, amplitude: f32, seconds: f64) -> SampleBuffer {
        let n = (48000.0 * seconds) as usize;
        let samples = (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / 48000.0).sin() as f32)
            .collect();
        SampleBuffer::from_mono(samples, 48000).unwrap()
    }

    #[test]
    fn test_bass_tone_lands_in_low_band() {
        let analysis = analyze(&sine(80.0, 0.5, 1.0)).unwrap();
        assert!(analysis.low_band_energy > 0.95);
        let sum = analysis.low_band_energy + analysis.mid_band_energy + analysis.high_band_energy;
        assert!((sum - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_sibilant_tone() {
        let analysis = analyze(&sine(7000.0, 0.5, 1.0)).unwrap();
        assert!(analysis.high_band_energy > 0.95);
        assert!(analysis.sibilance_ratio > 0.95);
        assert!(analysis.spectral_centroid_hz > 6000.0);
    }

    #[test]
    fn test_clipping_and_levels() {
        let analysis = analyze(&sine(1000.0, 1.0, 1.0)).unwrap();
        assert!(analysis.is_clipping);
        assert!((analysis.rms_db + 3.01).abs() < 0.05);
        assert!((analysis.crest_factor_db - 3.01).abs() < 0.05);
        assert!(analysis.sample_peak_db > -0.01);
        assert!(!analysis.is_silent);
    }

    #[test]
    fn test_silence() {
        let silence = SampleBuffer::new(vec![0.0; 96000], 48000, 2).unwrap();
        let analysis = analyze(&silence).unwrap();
        assert!(analysis.is_silent);
        assert_eq!(analysis.rms_db, -96.0);
        assert_eq!(analysis.low_band_energy, 0.0);
        assert_eq!(analysis.integrated_lufs, -70.0);
        assert!(!analysis.is_clipping);
    }

    #[test]
    fn test_rejects_non_finite() {
        let bad = SampleBuffer::from_mono(vec![0.0, f32::NAN, 0.0], 48000).unwrap();
        assert!(matches!(analyze(&bad), Err(AnalysisError::InvalidSignal(_))));
        let empty = SampleBuffer::from_mono(Vec::new(), 48000).unwrap();
        assert!(matches!(analyze(&empty), Err(AnalysisError::InvalidSignal(_))));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let signal = sine(440.0, 0.3, 0.5);
        assert_eq!(analyze(&signal).unwrap(), analyze(&signal).unwrap());
    }
}

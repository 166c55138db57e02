//! Short-time analysis: how level, crest, band balance and transient activity
//! evolve over the track.
//!
//! The mono mixdown is cut into 300 ms frames with 50 % overlap. A track
//! shorter than one frame is analyzed as a single frame.

use refmaster_core::SampleBuffer;
use serde::{Deserialize, Serialize};

use crate::dynamics::{crest_factor_db, rms_db};
use crate::error::Result;
use crate::spectrum::Spectrum;

/// Frame length in seconds.
pub const FRAME_SECONDS: f32 = 0.3;
/// Hop between frames as a fraction of the frame length.
pub const HOP_FRACTION: f32 = 0.5;
/// A first difference counts as a transient when it exceeds
/// `mean + TRANSIENT_SIGMA · σ` of the frame's differences.
pub const TRANSIENT_SIGMA: f32 = 2.0;

/// Descriptors of one analysis frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalFrame {
    /// Frame centre in seconds.
    pub time_secs: f32,
    /// RMS level in dB.
    pub loudness_db: f32,
    /// Peak-to-RMS ratio in dB.
    pub crest_db: f32,
    /// Power fraction per band, summing to 1 unless the frame is silent.
    pub band_energies: Vec<f32>,
    /// Fraction of first differences above the frame's transient threshold.
    pub transient_density: f32,
}

/// Frame-by-frame analysis with summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    /// Band edges the per-frame energies were computed over (Hz).
    pub band_edges_hz: Vec<f32>,
    /// Frames in time order.
    pub frames: Vec<TemporalFrame>,
    /// Mean of the frame loudness values (dB).
    pub mean_loudness_db: f32,
    /// Loudest frame (dB).
    pub peak_loudness_db: f32,
    /// Quietest frame (dB).
    pub min_loudness_db: f32,
    /// Mean of the frame crest factors (dB).
    pub mean_crest_db: f32,
    /// Mean transient density.
    pub mean_transient_density: f32,
}

/// Analyze a signal frame by frame.
///
/// `band_edges_hz` must hold at least two ascending edges; each frame reports
/// one energy fraction per consecutive edge pair.
///
/// # Errors
///
/// [`AnalysisError::InvalidSignal`](crate::AnalysisError::InvalidSignal)
/// for empty or non-finite input.
pub fn analyze_temporal(signal: &SampleBuffer, band_edges_hz: &[f32]) -> Result<TemporalAnalysis> {
    signal.validate_signal()?;

    let mono = signal.to_mono();
    let sample_rate = signal.sample_rate() as f32;
    let frame_len = ((FRAME_SECONDS * sample_rate) as usize).clamp(1, mono.len());
    let hop = ((frame_len as f32 * HOP_FRACTION) as usize).max(1);
    let fft_size = frame_len.next_power_of_two();

    let mut frames = Vec::new();
    let mut start = 0usize;
    while start + frame_len <= mono.len() {
        let frame = &mono[start..start + frame_len];
        let spectrum = Spectrum::welch(frame, sample_rate, fft_size);
        frames.push(TemporalFrame {
            time_secs: (start as f32 + frame_len as f32 / 2.0) / sample_rate,
            loudness_db: rms_db(frame),
            crest_db: crest_factor_db(frame),
            band_energies: band_energies(&spectrum, band_edges_hz),
            transient_density: transient_density(frame),
        });
        start += hop;
    }

    let count = frames.len().max(1) as f32;
    let mean = |f: fn(&TemporalFrame) -> f32| frames.iter().map(f).sum::<f32>() / count;
    let mean_loudness_db = mean(|f| f.loudness_db);
    let mean_crest_db = mean(|f| f.crest_db);
    let mean_transient_density = mean(|f| f.transient_density);
    let peak_loudness_db = frames
        .iter()
        .map(|f| f.loudness_db)
        .fold(f32::NEG_INFINITY, f32::max);
    let min_loudness_db = frames
        .iter()
        .map(|f| f.loudness_db)
        .fold(f32::INFINITY, f32::min);

    Ok(TemporalAnalysis {
        band_edges_hz: band_edges_hz.to_vec(),
        frames,
        mean_loudness_db,
        peak_loudness_db,
        min_loudness_db,
        mean_crest_db,
        mean_transient_density,
    })
}

fn band_energies(spectrum: &Spectrum, edges: &[f32]) -> Vec<f32> {
    let powers: Vec<f32> = edges
        .windows(2)
        .map(|pair| spectrum.band_power(pair[0], pair[1]))
        .collect();
    let total: f32 = powers.iter().sum();
    if total > 1e-20 {
        powers.iter().map(|p| p / total).collect()
    } else {
        vec![0.0; powers.len()]
    }
}

fn transient_density(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f32> = frame.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let n = diffs.len() as f32;
    let mean = diffs.iter().sum::<f32>() / n;
    let variance = diffs.iter().map(|d| (d - mean) * (d - mean)).sum::<f32>() / n;
    let threshold = mean + TRANSIENT_SIGMA * variance.sqrt();
    diffs.iter().filter(|&&d| d > threshold).count() as f32 / n
}

//! Per-run diagnostics, serializable to JSON.

use refmaster_analysis::TrackAnalysis;
use refmaster_config::{DeEsserMode, EqMode, MasteringOptions};
use serde::{Deserialize, Serialize};

use crate::convergence::ConvergenceReport;
use crate::decision::MasteringDecision;
use crate::true_peak_guard::TruePeakReport;

/// Target minus reference band-energy fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandBalanceDeltas {
    /// Below 200 Hz.
    pub low: f32,
    /// 200 Hz to 4 kHz.
    pub mid: f32,
    /// 4 kHz and up.
    pub high: f32,
}

impl BandBalanceDeltas {
    /// Deltas between two analyses, `target - reference`.
    pub fn between(target: &TrackAnalysis, reference: &TrackAnalysis) -> Self {
        Self {
            low: target.low_band_energy - reference.low_band_energy,
            mid: target.mid_band_energy - reference.mid_band_energy,
            high: target.high_band_energy - reference.high_band_energy,
        }
    }
}

/// Parameters the chain actually ran with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedChain {
    /// `fixed` or `reference-match`.
    pub eq_mode: String,
    /// Preset name.
    pub eq_preset: String,
    /// `off` or `auto`.
    pub de_esser_mode: String,
    /// Initial loudness delta folded into the gain stage (dB).
    pub loudness_gain_db: f32,
    /// Broad gain from the decision (dB).
    pub gain_db: f32,
    /// Low shelf gain including the preset offset (dB).
    pub low_shelf_gain_db: f32,
    /// High shelf gain including the preset offset (dB).
    pub high_shelf_gain_db: f32,
    /// Compressor threshold (dB).
    pub compressor_threshold_db: f32,
    /// Compressor ratio.
    pub compressor_ratio: f32,
    /// De-esser threshold when the stage ran (dB).
    pub de_esser_threshold_db: Option<f32>,
    /// De-esser depth when the stage ran (dB).
    pub de_esser_depth_db: Option<f32>,
    /// Bands in the reference-match bank; zero in fixed mode.
    pub reference_match_bands: usize,
}

impl AppliedChain {
    /// Summarize the chain built from `decision` under `options`.
    pub fn new(decision: &MasteringDecision, options: &MasteringOptions, loudness_gain_db: f32) -> Self {
        let de_esser = match options.de_esser_mode {
            DeEsserMode::Auto => decision.de_esser,
            DeEsserMode::Off => None,
        };
        let reference_match_bands = match options.eq_mode {
            EqMode::ReferenceMatch => decision.band_corrections.len(),
            EqMode::Fixed => 0,
        };
        Self {
            eq_mode: options.eq_mode.to_string(),
            eq_preset: options.eq_preset.to_string(),
            de_esser_mode: options.de_esser_mode.to_string(),
            loudness_gain_db,
            gain_db: decision.gain_db,
            low_shelf_gain_db: decision.low_shelf_gain_db + options.eq_preset.low_shelf_offset_db(),
            high_shelf_gain_db: decision.high_shelf_gain_db
                + options.eq_preset.high_shelf_offset_db(),
            compressor_threshold_db: decision.compressor_threshold_db,
            compressor_ratio: decision.compressor_ratio,
            de_esser_threshold_db: de_esser.map(|s| s.threshold_db),
            de_esser_depth_db: de_esser.map(|s| s.depth_db),
            reference_match_bands,
        }
    }
}

/// Everything a caller needs to audit one mastering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteringDiagnostics {
    /// Profile the run used.
    pub profile: String,
    /// Target loudness before processing (LUFS).
    pub input_lufs: f32,
    /// Reference loudness (LUFS).
    pub reference_lufs: f32,
    /// Mastered loudness (LUFS).
    pub output_lufs: f32,
    /// Target minus reference crest factor (dB).
    pub crest_factor_delta_db: f32,
    /// Target minus reference band balance.
    pub band_balance: BandBalanceDeltas,
    /// Limiter ceiling (dB).
    pub limiter_ceiling_db: f32,
    /// True-peak guard outcome.
    pub true_peak: TruePeakReport,
    /// Loudness loop outcome.
    pub convergence: ConvergenceReport,
    /// Chain summary.
    pub applied_chain: AppliedChain,
}

impl MasteringDiagnostics {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

//! Mastering profile file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_profile};

/// Tuning tables for one mastering run.
///
/// Every section has serde defaults matching the `default` factory profile,
/// so a TOML file only needs to name the values it changes.
///
/// # TOML Format
///
/// ```toml
/// name = "club"
/// description = "Louder, brighter masters"
///
/// [analysis]
/// eq_max_abs_db = 5.0
///
/// [loudness]
/// tolerance_lu = 0.25
/// max_iterations = 4
///
/// [true_peak]
/// target_dbtp = -0.5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MasteringProfile {
    /// Profile identity, recorded in every decision and report.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Spectral-match band layout and correction limits.
    #[serde(default)]
    pub analysis: AnalysisTuning,

    /// Clamp ranges for the mastering decision.
    #[serde(default)]
    pub decision: DecisionTuning,

    /// Loudness convergence loop.
    #[serde(default)]
    pub loudness: LoudnessTuning,

    /// True-peak guard.
    #[serde(default)]
    pub true_peak: TruePeakTuning,
}

/// Band layout and limits for reference spectral matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisTuning {
    /// Ascending band edges in Hz; consecutive pairs form the match bands.
    pub band_edges_hz: Vec<f32>,
    /// Largest correction applied to any band (dB).
    pub eq_max_abs_db: f32,
    /// Corrections smaller than this are dropped (dB).
    pub eq_min_correction_db: f32,
    /// Both signals are normalized to this RMS level before comparison (dB).
    pub normalized_rms_db: f32,
    /// 3-tap smoothing kernel applied across band deltas.
    pub smoothing_kernel: [f32; 3],
}

impl Default for AnalysisTuning {
    fn default() -> Self {
        Self {
            band_edges_hz: vec![
                20.0, 60.0, 120.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
            ],
            eq_max_abs_db: 4.0,
            eq_min_correction_db: 0.75,
            normalized_rms_db: -24.0,
            smoothing_kernel: [0.25, 0.5, 0.25],
        }
    }
}

/// Mapping constants and clamp ranges for the decision engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecisionTuning {
    /// Broad gain is clamped to ±this (dB).
    pub gain_max_db: f32,
    /// Band-energy fraction delta to shelf gain scale (dB per unit).
    pub shelf_scale_db: f32,
    /// Shelf gains are clamped to ±this (dB).
    pub shelf_max_db: f32,
    /// Compressor threshold at zero crest delta (dB).
    pub threshold_base_db: f32,
    /// Threshold change per dB of crest delta.
    pub threshold_crest_slope: f32,
    /// Lowest compressor threshold (dB).
    pub threshold_min_db: f32,
    /// Highest compressor threshold (dB).
    pub threshold_max_db: f32,
    /// Compressor ratio at zero crest delta.
    pub ratio_base: f32,
    /// Ratio increase per dB of positive crest delta.
    pub ratio_crest_slope: f32,
    /// Lowest compressor ratio.
    pub ratio_min: f32,
    /// Hard safety ceiling on the compressor ratio.
    pub ratio_ceiling: f32,
    /// Limiter ceiling for clean input (dB).
    pub limiter_ceiling_db: f32,
    /// Limiter ceiling when the target already clips (dB).
    pub clipping_ceiling_db: f32,
    /// De-esser trigger and mapping.
    pub de_esser: DeEsserTuning,
}

impl Default for DecisionTuning {
    fn default() -> Self {
        Self {
            gain_max_db: 8.0,
            shelf_scale_db: 12.0,
            shelf_max_db: 3.0,
            threshold_base_db: -22.0,
            threshold_crest_slope: 1.2,
            threshold_min_db: -30.0,
            threshold_max_db: -14.0,
            ratio_base: 2.2,
            ratio_crest_slope: 0.3,
            ratio_min: 1.5,
            ratio_ceiling: 4.0,
            limiter_ceiling_db: -0.9,
            clipping_ceiling_db: -1.0,
            de_esser: DeEsserTuning::default(),
        }
    }
}

/// De-esser trigger and parameter mapping.
///
/// The decision engine works on the sibilance-ratio delta (target minus
/// reference, a power fraction in `0..=1`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeEsserTuning {
    /// Smallest positive sibilance delta that enables the de-esser.
    pub min_trigger: f32,
    /// Depth per unit of sibilance delta (dB).
    pub depth_scale_db: f32,
    /// Lowest depth when enabled (dB).
    pub depth_min_db: f32,
    /// Highest depth (dB).
    pub depth_max_db: f32,
    /// Threshold at zero sibilance delta (dB).
    pub threshold_base_db: f32,
    /// Threshold drop per unit of sibilance delta (dB).
    pub threshold_slope_db: f32,
    /// Lowest threshold (dB).
    pub threshold_min_db: f32,
    /// Highest threshold (dB).
    pub threshold_max_db: f32,
}

impl Default for DeEsserTuning {
    fn default() -> Self {
        Self {
            min_trigger: 0.01,
            depth_scale_db: 60.0,
            depth_min_db: 1.0,
            depth_max_db: 6.0,
            threshold_base_db: -28.0,
            threshold_slope_db: 40.0,
            threshold_min_db: -40.0,
            threshold_max_db: -20.0,
        }
    }
}

/// Loudness convergence controller settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoudnessTuning {
    /// Accepted distance from the reference loudness (LU).
    pub tolerance_lu: f32,
    /// Largest corrective gain per iteration (dB).
    pub max_correction_db: f32,
    /// The initial loudness delta is clamped to ±this (dB).
    pub delta_max_db: f32,
    /// Corrective iterations after the initial render.
    pub max_iterations: u32,
}

impl Default for LoudnessTuning {
    fn default() -> Self {
        Self {
            tolerance_lu: 0.3,
            max_correction_db: 1.5,
            delta_max_db: 12.0,
            max_iterations: 3,
        }
    }
}

/// True-peak guard settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TruePeakTuning {
    /// Highest accepted true peak (dBTP).
    pub target_dbtp: f32,
    /// Overshoot allowed before the guard trims (dB).
    pub tolerance_db: f32,
    /// Oversampling factor for the measurement.
    pub oversample_factor: u32,
}

impl Default for TruePeakTuning {
    fn default() -> Self {
        Self {
            target_dbtp: -1.0,
            tolerance_db: 0.1,
            oversample_factor: 4,
        }
    }
}

impl MasteringProfile {
    /// Create a profile with default tunings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            analysis: AnalysisTuning::default(),
            decision: DecisionTuning::default(),
            loudness: LoudnessTuning::default(),
            true_peak: TruePeakTuning::default(),
        }
    }

    /// Rename the profile.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the analysis tuning.
    pub fn with_analysis(mut self, analysis: AnalysisTuning) -> Self {
        self.analysis = analysis;
        self
    }

    /// Replace the decision tuning.
    pub fn with_decision(mut self, decision: DecisionTuning) -> Self {
        self.decision = decision;
        self
    }

    /// Replace the loudness tuning.
    pub fn with_loudness(mut self, loudness: LoudnessTuning) -> Self {
        self.loudness = loudness;
        self
    }

    /// Set the true-peak target and tolerance.
    pub fn with_true_peak_target(mut self, target_dbtp: f32, tolerance_db: f32) -> Self {
        self.true_peak.target_dbtp = target_dbtp;
        self.true_peak.tolerance_db = tolerance_db;
        self
    }

    /// Set the number of corrective loudness iterations.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.loudness.max_iterations = max_iterations;
        self
    }

    /// Check every tuning value against its allowed range.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_profile(self)
    }

    /// Load a profile from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a profile from a TOML string and validate it.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let profile: MasteringProfile = toml::from_str(toml_str)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Save the profile to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the profile to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for MasteringProfile {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_tables() {
        let profile = MasteringProfile::default();
        assert_eq!(profile.name, "default");
        assert_eq!(profile.analysis.band_edges_hz.len(), 10);
        assert_eq!(profile.analysis.smoothing_kernel, [0.25, 0.5, 0.25]);
        assert_eq!(profile.decision.ratio_ceiling, 4.0);
        assert_eq!(profile.true_peak.oversample_factor, 4);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let profile = MasteringProfile::from_toml(
            r#"
name = "club"

[loudness]
tolerance_lu = 0.25

[true_peak]
target_dbtp = -0.5
"#,
        )
        .unwrap();
        assert_eq!(profile.name, "club");
        assert_eq!(profile.loudness.tolerance_lu, 0.25);
        assert_eq!(profile.loudness.max_correction_db, 1.5);
        assert_eq!(profile.true_peak.target_dbtp, -0.5);
        assert_eq!(profile.true_peak.tolerance_db, 0.1);
        assert_eq!(profile.analysis, AnalysisTuning::default());
    }

    #[test]
    fn test_builder() {
        let profile = MasteringProfile::new("x")
            .with_description("test")
            .with_max_iterations(6)
            .with_true_peak_target(-2.0, 0.05);
        assert_eq!(profile.description.as_deref(), Some("test"));
        assert_eq!(profile.loudness.max_iterations, 6);
        assert_eq!(profile.true_peak.target_dbtp, -2.0);
    }

    #[test]
    fn test_toml_roundtrip() {
        let original = MasteringProfile::new("roundtrip").with_description("desc");
        let toml = original.to_toml().unwrap();
        assert!(toml.contains("name = \"roundtrip\""));
        assert!(toml.contains("[analysis]"));
        let parsed = MasteringProfile::from_toml(&toml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_from_toml_rejects_invalid_values() {
        let err = MasteringProfile::from_toml(
            r#"
name = "broken"
[decision]
ratio_min = 5.0
ratio_ceiling = 2.0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err}");
    }

    #[test]
    fn test_from_toml_rejects_bad_syntax() {
        let err = MasteringProfile::from_toml("name = ").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}

//! Range and consistency checks for mastering profiles.
//!
//! [`validate_profile`] collects every problem it finds; a single problem is
//! returned as-is, several are wrapped in [`ValidationError::Multiple`].

use thiserror::Error;

use crate::MasteringProfile;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range (NaN is always out of range).
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted parameter path, e.g. `loudness.tolerance_lu`.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Two parameters that bound a range are in the wrong order.
    #[error("'{low}' ({low_value}) must not exceed '{high}' ({high_value})")]
    Inverted {
        /// Lower-bound parameter.
        low: String,
        /// Its value.
        low_value: f32,
        /// Upper-bound parameter.
        high: String,
        /// Its value.
        high_value: f32,
    },

    /// Structurally invalid parameter.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Dotted parameter path.
        param: String,
        /// Description of the problem.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Default)]
struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    fn range(&mut self, param: &str, value: f32, min: f32, max: f32) {
        if !(min..=max).contains(&value) {
            self.errors.push(ValidationError::OutOfRange {
                param: param.to_string(),
                value,
                min,
                max,
            });
        }
    }

    fn ordered(&mut self, low: &str, low_value: f32, high: &str, high_value: f32) {
        if low_value > high_value {
            self.errors.push(ValidationError::Inverted {
                low: low.to_string(),
                low_value,
                high: high.to_string(),
                high_value,
            });
        }
    }

    fn format(&mut self, param: &str, reason: impl Into<String>) {
        self.errors.push(ValidationError::InvalidFormat {
            param: param.to_string(),
            reason: reason.into(),
        });
    }

    fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}

/// Validate every tuning value of a profile.
///
/// # Errors
///
/// Returns the first problem, or [`ValidationError::Multiple`] when there is
/// more than one.
pub fn validate_profile(profile: &MasteringProfile) -> ValidationResult<()> {
    let mut c = Checker::default();

    if profile.name.trim().is_empty() {
        c.format("name", "must not be empty");
    }

    let a = &profile.analysis;
    if a.band_edges_hz.len() < 2 {
        c.format("analysis.band_edges_hz", "needs at least two edges");
    } else if a
        .band_edges_hz
        .iter()
        .any(|e| !e.is_finite() || *e <= 0.0)
    {
        c.format("analysis.band_edges_hz", "edges must be positive and finite");
    } else if a.band_edges_hz.windows(2).any(|w| w[1] <= w[0]) {
        c.format("analysis.band_edges_hz", "edges must be strictly ascending");
    }
    c.range("analysis.eq_max_abs_db", a.eq_max_abs_db, 0.0, 24.0);
    c.range("analysis.eq_min_correction_db", a.eq_min_correction_db, 0.0, 24.0);
    c.ordered(
        "analysis.eq_min_correction_db",
        a.eq_min_correction_db,
        "analysis.eq_max_abs_db",
        a.eq_max_abs_db,
    );
    c.range("analysis.normalized_rms_db", a.normalized_rms_db, -60.0, 0.0);
    for tap in a.smoothing_kernel {
        c.range("analysis.smoothing_kernel", tap, 0.0, 1.0);
    }
    if a.smoothing_kernel.iter().sum::<f32>() <= 0.0 {
        c.format("analysis.smoothing_kernel", "taps must not all be zero");
    }

    let d = &profile.decision;
    c.range("decision.gain_max_db", d.gain_max_db, 0.0, 24.0);
    c.range("decision.shelf_scale_db", d.shelf_scale_db, 0.0, 100.0);
    c.range("decision.shelf_max_db", d.shelf_max_db, 0.0, 24.0);
    c.range("decision.threshold_base_db", d.threshold_base_db, -60.0, 0.0);
    c.range("decision.threshold_crest_slope", d.threshold_crest_slope, 0.0, 10.0);
    c.range("decision.threshold_min_db", d.threshold_min_db, -60.0, 0.0);
    c.range("decision.threshold_max_db", d.threshold_max_db, -60.0, 0.0);
    c.ordered(
        "decision.threshold_min_db",
        d.threshold_min_db,
        "decision.threshold_max_db",
        d.threshold_max_db,
    );
    c.range("decision.ratio_base", d.ratio_base, 1.0, 20.0);
    c.range("decision.ratio_crest_slope", d.ratio_crest_slope, 0.0, 5.0);
    c.range("decision.ratio_min", d.ratio_min, 1.0, 20.0);
    c.range("decision.ratio_ceiling", d.ratio_ceiling, 1.0, 20.0);
    c.ordered(
        "decision.ratio_min",
        d.ratio_min,
        "decision.ratio_ceiling",
        d.ratio_ceiling,
    );
    c.range("decision.limiter_ceiling_db", d.limiter_ceiling_db, -30.0, 0.0);
    c.range("decision.clipping_ceiling_db", d.clipping_ceiling_db, -30.0, 0.0);

    let s = &d.de_esser;
    c.range("decision.de_esser.min_trigger", s.min_trigger, 0.0, 1.0);
    c.range("decision.de_esser.depth_scale_db", s.depth_scale_db, 0.0, 200.0);
    c.range("decision.de_esser.depth_min_db", s.depth_min_db, 0.0, 24.0);
    c.range("decision.de_esser.depth_max_db", s.depth_max_db, 0.0, 24.0);
    c.ordered(
        "decision.de_esser.depth_min_db",
        s.depth_min_db,
        "decision.de_esser.depth_max_db",
        s.depth_max_db,
    );
    c.range("decision.de_esser.threshold_base_db", s.threshold_base_db, -60.0, 0.0);
    c.range("decision.de_esser.threshold_slope_db", s.threshold_slope_db, 0.0, 200.0);
    c.range("decision.de_esser.threshold_min_db", s.threshold_min_db, -60.0, 0.0);
    c.range("decision.de_esser.threshold_max_db", s.threshold_max_db, -60.0, 0.0);
    c.ordered(
        "decision.de_esser.threshold_min_db",
        s.threshold_min_db,
        "decision.de_esser.threshold_max_db",
        s.threshold_max_db,
    );

    let l = &profile.loudness;
    c.range("loudness.tolerance_lu", l.tolerance_lu, 0.01, 6.0);
    c.range("loudness.max_correction_db", l.max_correction_db, 0.0, 12.0);
    c.range("loudness.delta_max_db", l.delta_max_db, 0.0, 24.0);
    c.range("loudness.max_iterations", l.max_iterations as f32, 0.0, 16.0);

    let t = &profile.true_peak;
    c.range("true_peak.target_dbtp", t.target_dbtp, -20.0, 0.0);
    c.range("true_peak.tolerance_db", t.tolerance_db, 0.0, 3.0);
    c.range("true_peak.oversample_factor", t.oversample_factor as f32, 1.0, 8.0);

    c.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoudnessTuning, get_factory_profile};

    #[test]
    fn test_factory_profiles_are_valid() {
        for name in crate::FACTORY_PROFILE_NAMES {
            let profile = get_factory_profile(name).unwrap();
            assert_eq!(validate_profile(&profile), Ok(()));
        }
    }

    #[test]
    fn test_single_error_is_not_wrapped() {
        let profile = MasteringProfile::default().with_true_peak_target(3.0, 0.1);
        let err = validate_profile(&profile).unwrap_err();
        assert!(
            matches!(err, ValidationError::OutOfRange { ref param, .. } if param == "true_peak.target_dbtp"),
            "got {err}"
        );
    }

    #[test]
    fn test_multiple_errors_are_collected() {
        let mut profile = MasteringProfile::default().with_loudness(LoudnessTuning {
            tolerance_lu: 0.0,
            max_iterations: 100,
            ..LoudnessTuning::default()
        });
        profile.decision.ratio_min = 5.0;
        let err = validate_profile(&profile).unwrap_err();
        let ValidationError::Multiple(errors) = err else {
            panic!("expected Multiple");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Inverted { .. })));
    }

    #[test]
    fn test_nan_is_out_of_range() {
        let mut profile = MasteringProfile::default();
        profile.decision.gain_max_db = f32::NAN;
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn test_band_edges_must_ascend() {
        let mut profile = MasteringProfile::default();
        profile.analysis.band_edges_hz = vec![100.0, 50.0, 200.0];
        let err = validate_profile(&profile).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"), "got {err}");

        profile.analysis.band_edges_hz = vec![100.0];
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let profile = MasteringProfile::default().with_name("  ");
        assert!(matches!(
            validate_profile(&profile),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}

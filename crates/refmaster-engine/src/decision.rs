//! Mapping from analysis deltas to bounded DSP parameters.
//!
//! Every output goes through [`bounded`]: a non-finite input collapses to the
//! mapping's neutral value and the result is clamped to the profile's range,
//! so no measurement, however extreme, can push a parameter out of bounds.

use refmaster_analysis::TrackAnalysis;
use refmaster_config::{DeEsserTuning, MasteringProfile};
use serde::{Deserialize, Serialize};

use crate::spectral_match::EqBandCorrection;

/// De-esser threshold and depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeEsserSettings {
    /// Sidechain trigger level (dB).
    pub threshold_db: f32,
    /// Largest high-band attenuation (dB).
    pub depth_db: f32,
}

/// Complete parameter set for one mastering chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteringDecision {
    /// Broad gain toward the reference RMS (dB).
    pub gain_db: f32,
    /// 125 Hz shelf gain before preset offsets (dB).
    pub low_shelf_gain_db: f32,
    /// 6 kHz shelf gain before preset offsets (dB).
    pub high_shelf_gain_db: f32,
    /// Compressor threshold (dB).
    pub compressor_threshold_db: f32,
    /// Compressor ratio.
    pub compressor_ratio: f32,
    /// Limiter output ceiling (dB).
    pub limiter_ceiling_db: f32,
    /// De-esser settings, absent when the target is not more sibilant than
    /// the reference.
    pub de_esser: Option<DeEsserSettings>,
    /// Reference-match bands, each clamped to the profile's EQ range.
    pub band_corrections: Vec<EqBandCorrection>,
    /// Name of the profile that produced this decision.
    pub profile: String,
}

/// `value` clamped to `[min, max]`, with non-finite input replaced by
/// `neutral` first. Inverted bounds are swapped rather than panicking.
pub(crate) fn bounded(value: f32, neutral: f32, min: f32, max: f32) -> f32 {
    let value = if value.is_finite() { value } else { neutral };
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    value.max(lo).min(hi)
}

/// Derive the mastering parameters for `target` given `reference`.
///
/// ```rust
/// use refmaster_engine::decide;
/// # use refmaster_analysis::TrackAnalysis;
/// # use refmaster_config::MasteringProfile;
/// # fn track(rms_db: f32) -> TrackAnalysis {
/// #     TrackAnalysis {
/// #         rms_db, spectral_centroid_hz: 1000.0, spectral_rolloff_hz: 5000.0,
/// #         low_band_energy: 0.3, mid_band_energy: 0.5, high_band_energy: 0.2,
/// #         crest_factor_db: 12.0, sibilance_ratio: 0.05, is_clipping: false,
/// #         is_silent: false, integrated_lufs: -14.0, sample_peak_db: -1.0,
/// #     }
/// # }
/// let decision = decide(&track(-30.0), &track(-12.0), &[], &MasteringProfile::default());
/// assert_eq!(decision.gain_db, 8.0);
/// ```
pub fn decide(
    target: &TrackAnalysis,
    reference: &TrackAnalysis,
    band_corrections: &[EqBandCorrection],
    profile: &MasteringProfile,
) -> MasteringDecision {
    let t = &profile.decision;

    let gain_db = bounded(reference.rms_db - target.rms_db, 0.0, -t.gain_max_db, t.gain_max_db);

    let shelf = |reference_energy: f32, target_energy: f32| {
        bounded(
            (reference_energy - target_energy) * t.shelf_scale_db,
            0.0,
            -t.shelf_max_db,
            t.shelf_max_db,
        )
    };
    let low_shelf_gain_db = shelf(reference.low_band_energy, target.low_band_energy);
    let high_shelf_gain_db = shelf(reference.high_band_energy, target.high_band_energy);

    let crest_delta = target.crest_factor_db - reference.crest_factor_db;
    let crest_delta = if crest_delta.is_finite() { crest_delta } else { 0.0 };
    let compressor_threshold_db = bounded(
        t.threshold_base_db + crest_delta * t.threshold_crest_slope,
        t.threshold_base_db,
        t.threshold_min_db,
        t.threshold_max_db,
    );
    let compressor_ratio = bounded(
        t.ratio_base + crest_delta.max(0.0) * t.ratio_crest_slope,
        t.ratio_base,
        t.ratio_min.min(t.ratio_ceiling),
        t.ratio_ceiling,
    );

    let limiter_ceiling_db = if target.is_clipping {
        t.clipping_ceiling_db.min(t.limiter_ceiling_db)
    } else {
        t.limiter_ceiling_db
    };

    let de_esser = de_esser_settings(
        target.sibilance_ratio - reference.sibilance_ratio,
        &t.de_esser,
    );

    let max_abs = profile.analysis.eq_max_abs_db.abs();
    let band_corrections = band_corrections
        .iter()
        .filter(|c| c.center_hz.is_finite() && c.center_hz > 0.0 && c.delta_db.is_finite())
        .map(|c| EqBandCorrection {
            center_hz: c.center_hz,
            delta_db: bounded(c.delta_db, 0.0, -max_abs, max_abs),
        })
        .collect();

    MasteringDecision {
        gain_db,
        low_shelf_gain_db,
        high_shelf_gain_db,
        compressor_threshold_db,
        compressor_ratio,
        limiter_ceiling_db,
        de_esser,
        band_corrections,
        profile: profile.name.clone(),
    }
}

/// De-esser settings for a sibilance delta (target − reference), or `None`
/// when the target is not sibilant enough to need one.
fn de_esser_settings(sibilance_delta: f32, t: &DeEsserTuning) -> Option<DeEsserSettings> {
    if !sibilance_delta.is_finite() || sibilance_delta <= 0.0 || sibilance_delta < t.min_trigger {
        return None;
    }
    Some(DeEsserSettings {
        threshold_db: bounded(
            t.threshold_base_db - sibilance_delta * t.threshold_slope_db,
            t.threshold_base_db,
            t.threshold_min_db,
            t.threshold_max_db,
        ),
        depth_db: bounded(
            sibilance_delta * t.depth_scale_db,
            t.depth_min_db,
            t.depth_min_db,
            t.depth_max_db,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> TrackAnalysis {
        TrackAnalysis {
            rms_db: -18.0,
            spectral_centroid_hz: 1500.0,
            spectral_rolloff_hz: 6000.0,
            low_band_energy: 0.3,
            mid_band_energy: 0.5,
            high_band_energy: 0.2,
            crest_factor_db: 12.0,
            sibilance_ratio: 0.05,
            is_clipping: false,
            is_silent: false,
            integrated_lufs: -16.0,
            sample_peak_db: -3.0,
        }
    }

    #[test]
    fn test_matched_tracks_give_neutral_decision() {
        let profile = MasteringProfile::default();
        let d = decide(&track(), &track(), &[], &profile);
        assert_eq!(d.gain_db, 0.0);
        assert_eq!(d.low_shelf_gain_db, 0.0);
        assert_eq!(d.high_shelf_gain_db, 0.0);
        assert_eq!(d.compressor_threshold_db, -22.0);
        assert_eq!(d.compressor_ratio, 2.2);
        assert_eq!(d.limiter_ceiling_db, -0.9);
        assert!(d.de_esser.is_none());
        assert_eq!(d.profile, "default");
    }

    #[test]
    fn test_shelves_follow_band_energy() {
        let target = track();
        let reference = TrackAnalysis {
            low_band_energy: 0.4,
            high_band_energy: 0.1,
            ..track()
        };
        let d = decide(&target, &reference, &[], &MasteringProfile::default());
        assert!((d.low_shelf_gain_db - 1.2).abs() < 1e-4);
        assert!((d.high_shelf_gain_db + 1.2).abs() < 1e-4);
    }

    #[test]
    fn test_bounded() {
        assert_eq!(bounded(5.0, 0.0, -1.0, 1.0), 1.0);
        assert_eq!(bounded(f32::NAN, 0.5, -1.0, 1.0), 0.5);
        assert_eq!(bounded(f32::NEG_INFINITY, 3.0, -1.0, 1.0), 1.0);
        assert_eq!(bounded(5.0, 0.0, 1.0, -1.0), 1.0);
    }

    #[test]
    fn test_clipping_target_tightens_ceiling() {
        let target = TrackAnalysis { is_clipping: true, ..track() };
        let d = decide(&target, &track(), &[], &MasteringProfile::default());
        assert_eq!(d.limiter_ceiling_db, -1.0);
    }

    #[test]
    fn test_de_esser_mapping() {
        let target = TrackAnalysis { sibilance_ratio: 0.10, ..track() };
        let d = decide(&target, &track(), &[], &MasteringProfile::default());
        let settings = d.de_esser.unwrap();
        // delta 0.05: depth 3 dB, threshold -28 - 2 = -30 dB
        assert!((settings.depth_db - 3.0).abs() < 1e-4);
        assert!((settings.threshold_db + 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_small_sibilance_delta_is_ignored() {
        let target = TrackAnalysis { sibilance_ratio: 0.055, ..track() };
        let d = decide(&target, &track(), &[], &MasteringProfile::default());
        assert!(d.de_esser.is_none());
    }

    #[test]
    fn test_non_finite_inputs_collapse_to_neutral() {
        let target = TrackAnalysis {
            rms_db: f32::NAN,
            crest_factor_db: f32::INFINITY,
            low_band_energy: f32::NAN,
            sibilance_ratio: f32::NAN,
            ..track()
        };
        let d = decide(&target, &track(), &[], &MasteringProfile::default());
        assert_eq!(d.gain_db, 0.0);
        assert_eq!(d.low_shelf_gain_db, 0.0);
        assert_eq!(d.compressor_threshold_db, -22.0);
        assert_eq!(d.compressor_ratio, 2.2);
        assert!(d.de_esser.is_none());
    }

    #[test]
    fn test_band_corrections_are_reclamped() {
        let corrections = [
            EqBandCorrection { center_hz: 100.0, delta_db: 9.0 },
            EqBandCorrection { center_hz: 1000.0, delta_db: f32::NAN },
            EqBandCorrection { center_hz: f32::NAN, delta_db: 1.0 },
        ];
        let d = decide(&track(), &track(), &corrections, &MasteringProfile::default());
        assert_eq!(d.band_corrections.len(), 1);
        assert_eq!(d.band_corrections[0].delta_db, 4.0);
    }
}

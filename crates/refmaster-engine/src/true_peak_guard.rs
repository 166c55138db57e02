//! Post-limiter true-peak check.
//!
//! The limiter works on sample peaks, so reconstruction between samples can
//! still overshoot. The guard measures the oversampled peak once and, when it
//! exceeds `target + tolerance`, trims by `-(overshoot + tolerance)` dB and
//! re-limits. The trim is capped at [`MAX_TRIM_DB`]; a signal hotter than that
//! is left to the limiter. There is never a second pass.

use refmaster_analysis::true_peak_dbtp;
use refmaster_config::TruePeakTuning;
use refmaster_core::SampleBuffer;
use serde::{Deserialize, Serialize};

use crate::backend::{DspBackend, LimiterParams};

/// Lowest true peak ever reported; silence reads this instead of `-inf`.
pub const DBTP_FLOOR: f32 = -96.0;

/// Largest attenuation the guard applies in one trim (dB).
pub const MAX_TRIM_DB: f32 = 12.0;

/// Outcome of one guard pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruePeakReport {
    /// True peak before any trim (dBTP).
    pub measured_dbtp: f32,
    /// True peak of the returned signal (dBTP).
    pub final_dbtp: f32,
    /// Profile target (dBTP).
    pub target_dbtp: f32,
    /// Accepted overshoot (dB).
    pub tolerance_db: f32,
    /// `target - final`; negative when the result still overshoots.
    pub margin_db: f32,
    /// Whether the trim-and-relimit pass ran.
    pub trimmed: bool,
    /// Gain applied by the trim (dB), zero when untrimmed.
    pub trim_db: f32,
}

/// Floored true peak of `signal` in dBTP.
pub fn measure_dbtp(signal: &SampleBuffer, oversample_factor: u32) -> f32 {
    let dbtp = true_peak_dbtp(signal, oversample_factor as usize);
    if dbtp.is_finite() {
        dbtp.max(DBTP_FLOOR)
    } else {
        DBTP_FLOOR
    }
}

/// Measure `signal` and trim it once if its true peak is over target.
pub fn enforce_true_peak<B: DspBackend + ?Sized>(
    signal: &SampleBuffer,
    limiter: &LimiterParams,
    tuning: &TruePeakTuning,
    backend: &B,
) -> (SampleBuffer, TruePeakReport) {
    let measured_dbtp = measure_dbtp(signal, tuning.oversample_factor);
    let overshoot = measured_dbtp - tuning.target_dbtp;

    let mut report = TruePeakReport {
        measured_dbtp,
        final_dbtp: measured_dbtp,
        target_dbtp: tuning.target_dbtp,
        tolerance_db: tuning.tolerance_db,
        margin_db: tuning.target_dbtp - measured_dbtp,
        trimmed: false,
        trim_db: 0.0,
    };
    if overshoot <= tuning.tolerance_db {
        tracing::debug!(measured_dbtp, target_dbtp = tuning.target_dbtp, "true peak within tolerance");
        return (signal.clone(), report);
    }

    let trim_db = -(overshoot + tuning.tolerance_db).min(MAX_TRIM_DB);
    let trimmed = backend.apply_gain(signal, trim_db);
    let output = backend.apply_limiter(&trimmed, limiter);
    let final_dbtp = measure_dbtp(&output, tuning.oversample_factor);
    tracing::info!(measured_dbtp, final_dbtp, trim_db, "true-peak guard trimmed output");

    report.final_dbtp = final_dbtp;
    report.margin_db = tuning.target_dbtp - final_dbtp;
    report.trimmed = true;
    report.trim_db = trim_db;
    (output, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeBackend;
    use refmaster_core::db_to_linear;

    const LIMITER: LimiterParams = LimiterParams {
        ceiling_db: -0.9,
        release_ms: 150.0,
        lookahead_ms: 5.0,
    };

    /// Quarter-rate sine sampled 45° off its crests: every sample sits 3 dB
    /// under the reconstructed peak.
    fn offset_quarter_rate(true_peak_db: f32) -> SampleBuffer {
        let amplitude = db_to_linear(true_peak_db);
        let samples = (0..48000)
            .map(|n| {
                let phase = std::f64::consts::FRAC_PI_2 * n as f64 + std::f64::consts::FRAC_PI_4;
                amplitude * phase.sin() as f32
            })
            .collect();
        SampleBuffer::from_mono(samples, 48000).unwrap()
    }

    #[test]
    fn test_overshoot_is_trimmed_once() {
        let signal = offset_quarter_rate(-0.5);
        let tuning = TruePeakTuning::default();
        let (output, report) = enforce_true_peak(&signal, &LIMITER, &tuning, &NativeBackend::new());

        assert!(report.trimmed);
        assert!((report.measured_dbtp + 0.5).abs() < 0.5, "{report:?}");
        assert!(report.final_dbtp <= -0.9, "{report:?}");
        assert!((report.trim_db + report.measured_dbtp + 1.0 + 0.1).abs() < 1e-4);
        assert!((measure_dbtp(&output, 4) - report.final_dbtp).abs() < 1e-6);
    }

    #[test]
    fn test_within_tolerance_is_untouched() {
        let signal = offset_quarter_rate(-3.0);
        let tuning = TruePeakTuning::default();
        let (output, report) = enforce_true_peak(&signal, &LIMITER, &tuning, &NativeBackend::new());
        assert!(!report.trimmed);
        assert_eq!(report.trim_db, 0.0);
        assert_eq!(output, signal);
        assert!(report.margin_db > 1.5);
    }

    #[test]
    fn test_silence_reads_floor() {
        let silence = SampleBuffer::from_mono(vec![0.0; 4800], 48000).unwrap();
        let (_, report) = enforce_true_peak(
            &silence,
            &LIMITER,
            &TruePeakTuning::default(),
            &NativeBackend::new(),
        );
        assert_eq!(report.measured_dbtp, DBTP_FLOOR);
        assert!(!report.trimmed);
    }

    #[test]
    fn test_hot_input_trim_is_capped() {
        let signal = offset_quarter_rate(20.0);
        let tuning = TruePeakTuning::default();
        let (output, report) = enforce_true_peak(&signal, &LIMITER, &tuning, &NativeBackend::new());

        assert!(report.trimmed);
        assert!(report.measured_dbtp > 15.0, "{report:?}");
        assert_eq!(report.trim_db, -MAX_TRIM_DB);
        assert!(output.samples().iter().all(|s| s.is_finite()));
    }
}

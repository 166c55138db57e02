//! Closed-loop loudness matching around the final limiter.
//!
//! The controller is a small state machine that never touches audio itself;
//! the pipeline feeds it measurements and applies the gains it asks for.
//!
//! ```text
//! Initial ──begin──▶ Measuring ──observe──▶ Converged
//!                       ▲            │
//!                       │            ├────▶ IterationLimit
//!                    applied         ▼
//!                       └──────── Correcting
//! ```
//!
//! A run takes at most `max_iterations + 1` measurements and always ends in
//! [`ConvergencePhase::Converged`] or [`ConvergencePhase::IterationLimit`].

use refmaster_config::LoudnessTuning;
use serde::{Deserialize, Serialize};

use crate::decision::bounded;

/// Where the controller is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConvergencePhase {
    /// Nothing rendered yet.
    Initial,
    /// Waiting for the loudness of the latest render.
    Measuring,
    /// Waiting for a corrective gain to be applied.
    Correcting,
    /// Within tolerance of the target.
    Converged,
    /// Out of iterations before reaching the tolerance.
    IterationLimit,
}

impl ConvergencePhase {
    /// True for `Converged` and `IterationLimit`.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConvergencePhase::Converged | ConvergencePhase::IterationLimit)
    }

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            ConvergencePhase::Initial => "initial",
            ConvergencePhase::Measuring => "measuring",
            ConvergencePhase::Correcting => "correcting",
            ConvergencePhase::Converged => "converged",
            ConvergencePhase::IterationLimit => "iteration-limit",
        }
    }
}

/// What the controller wants after a measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergenceStep {
    /// Apply `gain_db` to the limited signal, re-limit, then measure again.
    Correct {
        /// Corrective gain (dB).
        gain_db: f32,
    },
    /// Stop; the phase is terminal.
    Done(ConvergencePhase),
}

/// Summary of a finished loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// Terminal phase.
    pub outcome: ConvergencePhase,
    /// Corrective passes applied.
    pub iterations: u32,
    /// Loudness measurements taken.
    pub measurements: u32,
    /// Initial loudness delta plus every corrective gain (dB).
    pub gain_offset_db: f32,
    /// Loudness goal (LUFS).
    pub target_lufs: f32,
    /// Last measured loudness (LUFS).
    pub last_measured_lufs: Option<f32>,
}

/// Run-scoped controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceState {
    phase: ConvergencePhase,
    target_lufs: f32,
    loudness_delta_db: f32,
    gain_offset_db: f32,
    iterations: u32,
    measurements: u32,
    last_measured_lufs: Option<f32>,
    tolerance_lu: f32,
    max_correction_db: f32,
    max_iterations: u32,
}

impl ConvergenceState {
    /// Start a loop that moves material measured at `input_lufs` toward
    /// `target_lufs`.
    ///
    /// The initial delta is `target − input`, clamped to `±delta_max_db`.
    pub fn new(target_lufs: f32, input_lufs: f32, tuning: &LoudnessTuning) -> Self {
        let delta_max = tuning.delta_max_db.abs();
        let loudness_delta_db = bounded(target_lufs - input_lufs, 0.0, -delta_max, delta_max);
        Self {
            phase: ConvergencePhase::Initial,
            target_lufs,
            loudness_delta_db,
            gain_offset_db: loudness_delta_db,
            iterations: 0,
            measurements: 0,
            last_measured_lufs: None,
            tolerance_lu: tuning.tolerance_lu.abs(),
            max_correction_db: tuning.max_correction_db.abs(),
            max_iterations: tuning.max_iterations,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ConvergencePhase {
        self.phase
    }

    /// Gain to fold into the chain's gain stage for the first render (dB).
    pub fn loudness_delta_db(&self) -> f32 {
        self.loudness_delta_db
    }

    /// Loudness goal (LUFS).
    pub fn target_lufs(&self) -> f32 {
        self.target_lufs
    }

    /// Corrective passes applied so far.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Measurements taken so far.
    pub fn measurements(&self) -> u32 {
        self.measurements
    }

    /// Initial delta plus all corrections so far (dB).
    pub fn gain_offset_db(&self) -> f32 {
        self.gain_offset_db
    }

    /// Most recent measurement.
    pub fn last_measured_lufs(&self) -> Option<f32> {
        self.last_measured_lufs
    }

    /// The first render is done; the controller now waits for a measurement.
    pub fn begin(&mut self) {
        if self.phase == ConvergencePhase::Initial {
            self.phase = ConvergencePhase::Measuring;
        }
    }

    /// Feed the loudness of the latest render.
    ///
    /// Terminal states absorb further observations without counting them.
    pub fn observe(&mut self, measured_lufs: f32) -> ConvergenceStep {
        if self.phase.is_terminal() {
            return ConvergenceStep::Done(self.phase);
        }

        self.measurements += 1;
        self.last_measured_lufs = Some(measured_lufs);

        let error = self.target_lufs - measured_lufs;
        if !error.is_finite() || error.abs() <= self.tolerance_lu {
            self.phase = ConvergencePhase::Converged;
            return ConvergenceStep::Done(self.phase);
        }
        if self.iterations >= self.max_iterations {
            self.phase = ConvergencePhase::IterationLimit;
            return ConvergenceStep::Done(self.phase);
        }

        self.phase = ConvergencePhase::Correcting;
        ConvergenceStep::Correct {
            gain_db: bounded(error, 0.0, -self.max_correction_db, self.max_correction_db),
        }
    }

    /// The corrective gain was applied and the signal re-limited.
    pub fn applied(&mut self, gain_db: f32) {
        if self.phase != ConvergencePhase::Correcting {
            return;
        }
        self.gain_offset_db += gain_db;
        self.iterations += 1;
        self.phase = ConvergencePhase::Measuring;
    }

    /// Snapshot for diagnostics.
    pub fn report(&self) -> ConvergenceReport {
        ConvergenceReport {
            outcome: self.phase,
            iterations: self.iterations,
            measurements: self.measurements,
            gain_offset_db: self.gain_offset_db,
            target_lufs: self.target_lufs,
            last_measured_lufs: self.last_measured_lufs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning(max_iterations: u32) -> LoudnessTuning {
        LoudnessTuning {
            max_iterations,
            ..LoudnessTuning::default()
        }
    }

    #[test]
    fn test_initial_delta_is_clamped() {
        let state = ConvergenceState::new(-8.0, -40.0, &tuning(3));
        assert_eq!(state.loudness_delta_db(), 12.0);
        assert_eq!(state.phase(), ConvergencePhase::Initial);

        let state = ConvergenceState::new(-14.0, -16.0, &tuning(3));
        assert_eq!(state.loudness_delta_db(), 2.0);
    }

    #[test]
    fn test_converges_within_tolerance() {
        let mut state = ConvergenceState::new(-14.0, -20.0, &tuning(3));
        state.begin();
        assert_eq!(state.observe(-14.2), ConvergenceStep::Done(ConvergencePhase::Converged));
        assert_eq!(state.measurements(), 1);
        assert_eq!(state.iterations(), 0);
    }

    #[test]
    fn test_correction_is_clamped_and_counted() {
        let mut state = ConvergenceState::new(-14.0, -20.0, &tuning(3));
        state.begin();
        let step = state.observe(-17.0);
        assert_eq!(step, ConvergenceStep::Correct { gain_db: 1.5 });
        assert_eq!(state.phase(), ConvergencePhase::Correcting);
        state.applied(1.5);
        assert_eq!(state.phase(), ConvergencePhase::Measuring);
        assert_eq!(state.iterations(), 1);
        assert!((state.gain_offset_db() - 7.5).abs() < 1e-6);

        assert_eq!(state.observe(-14.1), ConvergenceStep::Done(ConvergencePhase::Converged));
    }

    #[test]
    fn test_iteration_limit_bounds_measurements() {
        let mut state = ConvergenceState::new(-8.0, -30.0, &tuning(2));
        state.begin();
        let mut steps = 0;
        loop {
            match state.observe(-20.0) {
                ConvergenceStep::Correct { gain_db } => state.applied(gain_db),
                ConvergenceStep::Done(phase) => {
                    assert_eq!(phase, ConvergencePhase::IterationLimit);
                    break;
                }
            }
            steps += 1;
            assert!(steps <= 10);
        }
        assert_eq!(state.iterations(), 2);
        assert_eq!(state.measurements(), 3);
        let report = state.report();
        assert_eq!(report.outcome, ConvergencePhase::IterationLimit);
        assert_eq!(report.last_measured_lufs, Some(-20.0));
    }

    #[test]
    fn test_zero_iterations_measures_once() {
        let mut state = ConvergenceState::new(-8.0, -30.0, &tuning(0));
        state.begin();
        assert_eq!(
            state.observe(-20.0),
            ConvergenceStep::Done(ConvergencePhase::IterationLimit)
        );
        assert_eq!(state.measurements(), 1);
    }

    #[test]
    fn test_terminal_state_absorbs_observations() {
        let mut state = ConvergenceState::new(-14.0, -14.0, &tuning(3));
        state.begin();
        state.observe(-14.0);
        state.observe(-30.0);
        state.applied(1.0);
        assert_eq!(state.measurements(), 1);
        assert_eq!(state.iterations(), 0);
        assert!(state.phase().is_terminal());
    }

    #[test]
    fn test_phase_serializes_kebab_case() {
        let json = serde_json::to_string(&ConvergencePhase::IterationLimit).unwrap();
        assert_eq!(json, "\"iteration-limit\"");
        assert_eq!(ConvergencePhase::IterationLimit.as_str(), "iteration-limit");
    }
}

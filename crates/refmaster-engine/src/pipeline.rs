//! End-to-end mastering run.

use refmaster_analysis::{TrackAnalysis, analyze, integrated_loudness};
use refmaster_config::{MasteringOptions, MasteringProfile};
use refmaster_core::SampleBuffer;

use crate::backend::{DspBackend, NativeBackend};
use crate::chain::build_chain;
use crate::convergence::{ConvergencePhase, ConvergenceState, ConvergenceStep};
use crate::decision::{MasteringDecision, decide};
use crate::diagnostics::{AppliedChain, BandBalanceDeltas, MasteringDiagnostics};
use crate::error::{MasteringError, Result};
use crate::spectral_match::{EqBandCorrection, band_spectrum, compute_band_corrections};
use crate::true_peak_guard::enforce_true_peak;

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct MasteringOutcome {
    /// Mastered audio, same format and length as the target.
    pub output: SampleBuffer,
    /// Parameters the chain was built from.
    pub decision: MasteringDecision,
    /// Raw reference-match corrections before the decision's re-clamp.
    pub band_corrections: Vec<EqBandCorrection>,
    /// Analysis of the unprocessed target.
    pub target_analysis: TrackAnalysis,
    /// Analysis of the reference.
    pub reference_analysis: TrackAnalysis,
    /// Run diagnostics.
    pub diagnostics: MasteringDiagnostics,
}

/// Masters a target toward a reference under one profile and option set.
///
/// The engine holds no per-run state; `master` can be called concurrently
/// from several threads on a shared engine.
///
/// # Example
///
/// ```rust,no_run
/// use refmaster_config::{MasteringOptions, get_factory_profile};
/// use refmaster_core::SampleBuffer;
/// use refmaster_engine::MasteringEngine;
///
/// # fn load() -> (SampleBuffer, SampleBuffer) { unimplemented!() }
/// let (target, reference) = load();
/// let profile = get_factory_profile("default").unwrap();
/// let engine = MasteringEngine::new(profile, MasteringOptions::default());
/// let outcome = engine.master(&target, &reference).unwrap();
/// println!("{}", outcome.diagnostics.to_json().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct MasteringEngine<B: DspBackend = NativeBackend> {
    profile: MasteringProfile,
    options: MasteringOptions,
    backend: B,
}

impl MasteringEngine<NativeBackend> {
    /// Engine with the native DSP backend.
    pub fn new(profile: MasteringProfile, options: MasteringOptions) -> Self {
        Self::with_backend(profile, options, NativeBackend::new())
    }
}

impl<B: DspBackend> MasteringEngine<B> {
    /// Engine with a custom backend.
    pub fn with_backend(profile: MasteringProfile, options: MasteringOptions, backend: B) -> Self {
        Self {
            profile,
            options,
            backend,
        }
    }

    /// Profile in use.
    pub fn profile(&self) -> &MasteringProfile {
        &self.profile
    }

    /// Options in use.
    pub fn options(&self) -> &MasteringOptions {
        &self.options
    }

    /// Backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Master `target` toward `reference`.
    ///
    /// # Errors
    ///
    /// - [`MasteringError::InvalidSignal`] for empty or non-finite input
    /// - [`MasteringError::UnsupportedChannels`] for anything but mono or stereo
    /// - [`MasteringError::FormatMismatch`] when the reference was not conformed
    ///   to the target's rate and layout
    /// - [`MasteringError::Meter`] when loudness cannot be measured
    pub fn master(&self, target: &SampleBuffer, reference: &SampleBuffer) -> Result<MasteringOutcome> {
        check_inputs(target, reference)?;
        let profile = &self.profile;

        let target_analysis = analyze(target)?;
        let reference_analysis = analyze(reference)?;
        tracing::debug!(
            target_lufs = target_analysis.integrated_lufs,
            reference_lufs = reference_analysis.integrated_lufs,
            target_crest_db = target_analysis.crest_factor_db,
            reference_crest_db = reference_analysis.crest_factor_db,
            "analyzed inputs"
        );

        let band_corrections = compute_band_corrections(
            &band_spectrum(target, &profile.analysis),
            &band_spectrum(reference, &profile.analysis),
            &profile.analysis,
        )?;
        tracing::debug!(bands = band_corrections.len(), "reference-match corrections");

        let decision = decide(&target_analysis, &reference_analysis, &band_corrections, profile);
        tracing::debug!(
            profile = %decision.profile,
            gain_db = decision.gain_db,
            threshold_db = decision.compressor_threshold_db,
            ratio = decision.compressor_ratio,
            ceiling_db = decision.limiter_ceiling_db,
            de_esser = decision.de_esser.is_some(),
            "decision"
        );

        let mut state = ConvergenceState::new(
            reference_analysis.integrated_lufs,
            target_analysis.integrated_lufs,
            &profile.loudness,
        );
        let chain = build_chain(&decision, &self.options, state.loudness_delta_db());
        let mut limited = chain.apply(&self.backend, target);
        state.begin();

        let outcome = loop {
            let measured = integrated_loudness(&limited)? as f32;
            match state.observe(measured) {
                ConvergenceStep::Correct { gain_db } => {
                    tracing::debug!(measured_lufs = measured, gain_db, "loudness correction");
                    let corrected = self.backend.apply_gain(&limited, gain_db);
                    limited = chain.limit(&self.backend, &corrected);
                    state.applied(gain_db);
                }
                ConvergenceStep::Done(phase) => break phase,
            }
        };
        match outcome {
            ConvergencePhase::IterationLimit => tracing::warn!(
                iterations = state.iterations(),
                last_lufs = ?state.last_measured_lufs(),
                target_lufs = state.target_lufs(),
                "loudness did not converge within the iteration limit"
            ),
            _ => tracing::info!(
                iterations = state.iterations(),
                measurements = state.measurements(),
                gain_offset_db = state.gain_offset_db(),
                "loudness converged"
            ),
        }

        let (output, true_peak) =
            enforce_true_peak(&limited, &chain.limiter(), &profile.true_peak, &self.backend);
        let output_lufs = integrated_loudness(&output)? as f32;

        let diagnostics = MasteringDiagnostics {
            profile: profile.name.clone(),
            input_lufs: target_analysis.integrated_lufs,
            reference_lufs: reference_analysis.integrated_lufs,
            output_lufs,
            crest_factor_delta_db: target_analysis.crest_factor_db
                - reference_analysis.crest_factor_db,
            band_balance: BandBalanceDeltas::between(&target_analysis, &reference_analysis),
            limiter_ceiling_db: decision.limiter_ceiling_db,
            true_peak,
            convergence: state.report(),
            applied_chain: AppliedChain::new(&decision, &self.options, state.loudness_delta_db()),
        };

        Ok(MasteringOutcome {
            output,
            decision,
            band_corrections,
            target_analysis,
            reference_analysis,
            diagnostics,
        })
    }
}

fn check_inputs(target: &SampleBuffer, reference: &SampleBuffer) -> Result<()> {
    target.validate_signal()?;
    reference.validate_signal()?;
    for channels in [target.channels(), reference.channels()] {
        if !(1..=2).contains(&channels) {
            return Err(MasteringError::UnsupportedChannels(channels));
        }
    }
    if !target.same_format(reference) {
        return Err(MasteringError::FormatMismatch {
            target_rate: target.sample_rate(),
            target_channels: target.channels(),
            reference_rate: reference.sample_rate(),
            reference_channels: reference.channels(),
        });
    }
    Ok(())
}

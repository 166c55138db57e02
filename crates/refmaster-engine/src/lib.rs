//! Refmaster Engine - reference-based mastering
//!
//! Given a target track and a reference track in the same format, the engine
//! analyzes both, derives bounded DSP parameters, renders the mastering chain
//! and then closes the loop on loudness and true peak:
//!
//! ```text
//! target ─┬─ analyze ─┐
//!         │           ├─ band corrections ─ decide ─ build chain
//! reference ─ analyze ┘                                   │
//!         └───────────── render ─ loudness loop ─ true-peak guard ─▶ output
//! ```
//!
//! - [`spectral_match`] - Per-band EQ corrections toward the reference
//! - [`decision`] - Clamped mapping from analysis deltas to parameters
//! - [`chain`] - Ordered chain stages built from a decision
//! - [`backend`] - [`DspBackend`] trait and the native implementation
//! - [`convergence`] - Loudness convergence state machine
//! - [`true_peak_guard`] - Single-pass oversampled peak trim
//! - [`diagnostics`] - JSON-serializable run report
//! - [`pipeline`] - [`MasteringEngine`], tying it all together
//!
//! ## Example
//!
//! ```rust
//! use refmaster_config::{MasteringOptions, MasteringProfile};
//! use refmaster_core::SampleBuffer;
//! use refmaster_engine::MasteringEngine;
//!
//! let tone = |amplitude: f32| {
//!     let samples = (0..48000)
//!         .map(|i| amplitude * (i as f32 * 0.0575).sin())
//!         .collect();
//!     SampleBuffer::from_mono(samples, 48000).unwrap()
//! };
//!
//! let engine = MasteringEngine::new(MasteringProfile::default(), MasteringOptions::default());
//! let outcome = engine.master(&tone(0.05), &tone(0.5)).unwrap();
//! assert!(outcome.output.peak() < 1.0);
//! assert!(outcome.diagnostics.convergence.outcome.is_terminal());
//! ```

pub mod backend;
pub mod chain;
pub mod convergence;
pub mod decision;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod spectral_match;
pub mod true_peak_guard;

pub use backend::{CompressorParams, DspBackend, LimiterParams, NativeBackend};
pub use chain::{ChainStage, MasteringChain, build_chain};
pub use convergence::{ConvergencePhase, ConvergenceReport, ConvergenceState, ConvergenceStep};
pub use decision::{DeEsserSettings, MasteringDecision, decide};
pub use diagnostics::{AppliedChain, BandBalanceDeltas, MasteringDiagnostics};
pub use error::{MasteringError, Result};
pub use pipeline::{MasteringEngine, MasteringOutcome};
pub use spectral_match::{
    BandSpectrum, EqBandCorrection, band_spectrum, compute_band_corrections, normalize_rms,
};
pub use true_peak_guard::{DBTP_FLOOR, MAX_TRIM_DB, TruePeakReport, enforce_true_peak, measure_dbtp};

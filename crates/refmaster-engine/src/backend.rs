//! DSP primitives behind a substitutable backend.
//!
//! The engine never touches an effect directly: every stage goes through a
//! [`DspBackend`], which takes a buffer and typed parameters and returns a new
//! buffer. [`NativeBackend`] renders with `refmaster-effects`, building a
//! fresh processor for every call so no state leaks between stages or runs.

use refmaster_core::{Effect, SampleBuffer};
use refmaster_effects::{
    BellFilter, Compressor, DeEsser, Gain, HighPassFilter, Limiter, ShelfFilter, ShelfKind,
};
use serde::{Deserialize, Serialize};

use crate::decision::DeEsserSettings;

/// Compressor settings for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorParams {
    /// Threshold (dB).
    pub threshold_db: f32,
    /// Ratio.
    pub ratio: f32,
    /// Attack (ms).
    pub attack_ms: f32,
    /// Release (ms).
    pub release_ms: f32,
}

/// Limiter settings for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimiterParams {
    /// Output ceiling (dB).
    pub ceiling_db: f32,
    /// Release (ms).
    pub release_ms: f32,
    /// Lookahead (ms).
    pub lookahead_ms: f32,
}

/// Offline renderer for the mastering chain's primitives.
///
/// Implementations must return a buffer with the input's rate, layout and
/// frame count, and must be deterministic.
pub trait DspBackend {
    /// Second-order high-pass at `cutoff_hz`.
    fn apply_highpass(&self, signal: &SampleBuffer, cutoff_hz: f32) -> SampleBuffer;

    /// Low or high shelf with its corner at `frequency_hz`.
    fn apply_shelf(
        &self,
        signal: &SampleBuffer,
        kind: ShelfKind,
        frequency_hz: f32,
        gain_db: f32,
    ) -> SampleBuffer;

    /// Peaking band centred at `frequency_hz`.
    fn apply_bell(&self, signal: &SampleBuffer, frequency_hz: f32, q: f32, gain_db: f32)
    -> SampleBuffer;

    /// Stereo-linked compressor.
    fn apply_compressor(&self, signal: &SampleBuffer, params: &CompressorParams) -> SampleBuffer;

    /// Static gain.
    fn apply_gain(&self, signal: &SampleBuffer, gain_db: f32) -> SampleBuffer;

    /// Dynamic sibilance reduction.
    fn apply_de_esser(&self, signal: &SampleBuffer, settings: &DeEsserSettings) -> SampleBuffer;

    /// Brickwall limiter, time-aligned with its input.
    fn apply_limiter(&self, signal: &SampleBuffer, params: &LimiterParams) -> SampleBuffer;
}

/// Backend built on `refmaster-effects`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl NativeBackend {
    /// Create the native backend.
    pub fn new() -> Self {
        Self
    }
}

/// Run `effect` over `signal` and compensate its latency.
///
/// `latency` frames of silence are appended so the tail is flushed, then the
/// first `latency` output frames are dropped; the result lines up sample for
/// sample with the input.
fn render<E: Effect>(mut effect: E, signal: &SampleBuffer) -> SampleBuffer {
    let channels = signal.channels() as usize;
    let padding = effect.latency_samples() * channels;
    signal.transformed(|samples| {
        samples.resize(samples.len() + padding, 0.0);
        effect.process_interleaved(samples, channels);
        samples.drain(..padding);
    })
}

impl DspBackend for NativeBackend {
    fn apply_highpass(&self, signal: &SampleBuffer, cutoff_hz: f32) -> SampleBuffer {
        render(HighPassFilter::new(sample_rate(signal), cutoff_hz), signal)
    }

    fn apply_shelf(
        &self,
        signal: &SampleBuffer,
        kind: ShelfKind,
        frequency_hz: f32,
        gain_db: f32,
    ) -> SampleBuffer {
        render(
            ShelfFilter::new(sample_rate(signal), kind, frequency_hz, gain_db),
            signal,
        )
    }

    fn apply_bell(
        &self,
        signal: &SampleBuffer,
        frequency_hz: f32,
        q: f32,
        gain_db: f32,
    ) -> SampleBuffer {
        render(
            BellFilter::new(sample_rate(signal), frequency_hz, q, gain_db),
            signal,
        )
    }

    fn apply_compressor(&self, signal: &SampleBuffer, params: &CompressorParams) -> SampleBuffer {
        let mut compressor = Compressor::new(sample_rate(signal));
        compressor.set_threshold_db(params.threshold_db);
        compressor.set_ratio(params.ratio);
        compressor.set_attack_ms(params.attack_ms);
        compressor.set_release_ms(params.release_ms);
        render(compressor, signal)
    }

    fn apply_gain(&self, signal: &SampleBuffer, gain_db: f32) -> SampleBuffer {
        render(Gain::new(gain_db), signal)
    }

    fn apply_de_esser(&self, signal: &SampleBuffer, settings: &DeEsserSettings) -> SampleBuffer {
        render(
            DeEsser::new(sample_rate(signal), settings.threshold_db, settings.depth_db),
            signal,
        )
    }

    fn apply_limiter(&self, signal: &SampleBuffer, params: &LimiterParams) -> SampleBuffer {
        let mut limiter = Limiter::new(sample_rate(signal));
        limiter.set_ceiling_db(params.ceiling_db);
        limiter.set_release_ms(params.release_ms);
        limiter.set_lookahead_ms(params.lookahead_ms);
        render(limiter, signal)
    }
}

fn sample_rate(signal: &SampleBuffer) -> f32 {
    signal.sample_rate() as f32
}

//! Ordered mastering chain built from a decision.
//!
//! ```text
//! HPF 30 Hz ─ low shelf 125 Hz ─ high shelf 6 kHz ─ [reference-match bank]
//!   ─ compressor ─ gain ─ [de-esser] ─ limiter
//! ```
//!
//! The limiter is kept apart from the other stages so the loudness loop can
//! re-run it on its own after a corrective gain.

use std::fmt;

use refmaster_config::{DeEsserMode, EqMode, MasteringOptions};
use refmaster_core::SampleBuffer;
use refmaster_effects::ShelfKind;

use crate::backend::{CompressorParams, DspBackend, LimiterParams};
use crate::decision::{DeEsserSettings, MasteringDecision};
use crate::spectral_match::EqBandCorrection;

/// Rumble filter corner.
pub const HIGHPASS_HZ: f32 = 30.0;
/// Broad low shelf corner.
pub const LOW_SHELF_HZ: f32 = 125.0;
/// Broad high shelf corner.
pub const HIGH_SHELF_HZ: f32 = 6000.0;

/// Bank bands centred at or below this become low shelves.
pub const BANK_LOW_SHELF_MAX_HZ: f32 = 250.0;
/// Bank bands centred at or above this become high shelves.
pub const BANK_HIGH_SHELF_MIN_HZ: f32 = 4000.0;
/// Lowest corner for a bank low shelf.
pub const BANK_LOW_SHELF_FLOOR_HZ: f32 = 40.0;
/// Highest corner for a bank high shelf.
pub const BANK_HIGH_SHELF_CEILING_HZ: f32 = 12000.0;
/// Q of the bank's mid-band bells.
pub const BANK_BELL_Q: f32 = 0.9;

/// Compressor attack (ms).
pub const COMPRESSOR_ATTACK_MS: f32 = 15.0;
/// Compressor release (ms).
pub const COMPRESSOR_RELEASE_MS: f32 = 120.0;
/// Limiter release (ms).
pub const LIMITER_RELEASE_MS: f32 = 150.0;
/// Limiter lookahead (ms).
pub const LIMITER_LOOKAHEAD_MS: f32 = 5.0;

/// One processing stage with its resolved parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChainStage {
    /// Second-order high-pass.
    HighPass {
        /// Corner (Hz).
        cutoff_hz: f32,
    },
    /// Low or high shelf.
    Shelf {
        /// Which end of the spectrum.
        kind: ShelfKind,
        /// Corner (Hz).
        frequency_hz: f32,
        /// Shelf gain (dB).
        gain_db: f32,
    },
    /// Peaking band.
    Bell {
        /// Centre (Hz).
        frequency_hz: f32,
        /// Quality factor.
        q: f32,
        /// Peak gain (dB).
        gain_db: f32,
    },
    /// Stereo-linked compressor.
    Compressor(CompressorParams),
    /// Static gain.
    Gain {
        /// Gain (dB).
        gain_db: f32,
    },
    /// Split-band de-esser.
    DeEsser(DeEsserSettings),
    /// Brickwall limiter.
    Limiter(LimiterParams),
}

impl ChainStage {
    /// Short stage name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ChainStage::HighPass { .. } => "highpass",
            ChainStage::Shelf { kind: ShelfKind::Low, .. } => "low-shelf",
            ChainStage::Shelf { kind: ShelfKind::High, .. } => "high-shelf",
            ChainStage::Bell { .. } => "bell",
            ChainStage::Compressor(_) => "compressor",
            ChainStage::Gain { .. } => "gain",
            ChainStage::DeEsser(_) => "de-esser",
            ChainStage::Limiter(_) => "limiter",
        }
    }

    /// Render this stage with `backend`.
    pub fn apply<B: DspBackend + ?Sized>(&self, backend: &B, signal: &SampleBuffer) -> SampleBuffer {
        match *self {
            ChainStage::HighPass { cutoff_hz } => backend.apply_highpass(signal, cutoff_hz),
            ChainStage::Shelf {
                kind,
                frequency_hz,
                gain_db,
            } => backend.apply_shelf(signal, kind, frequency_hz, gain_db),
            ChainStage::Bell {
                frequency_hz,
                q,
                gain_db,
            } => backend.apply_bell(signal, frequency_hz, q, gain_db),
            ChainStage::Compressor(ref params) => backend.apply_compressor(signal, params),
            ChainStage::Gain { gain_db } => backend.apply_gain(signal, gain_db),
            ChainStage::DeEsser(ref settings) => backend.apply_de_esser(signal, settings),
            ChainStage::Limiter(ref params) => backend.apply_limiter(signal, params),
        }
    }
}

impl fmt::Display for ChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStage::HighPass { cutoff_hz } => write!(f, "highpass {cutoff_hz:.0} Hz"),
            ChainStage::Shelf {
                frequency_hz,
                gain_db,
                ..
            } => write!(f, "{} {frequency_hz:.0} Hz {gain_db:+.2} dB", self.name()),
            ChainStage::Bell {
                frequency_hz,
                q,
                gain_db,
            } => write!(f, "bell {frequency_hz:.0} Hz Q{q:.2} {gain_db:+.2} dB"),
            ChainStage::Compressor(p) => write!(
                f,
                "compressor {:.1} dB {:.2}:1 ({:.0}/{:.0} ms)",
                p.threshold_db, p.ratio, p.attack_ms, p.release_ms
            ),
            ChainStage::Gain { gain_db } => write!(f, "gain {gain_db:+.2} dB"),
            ChainStage::DeEsser(s) => {
                write!(f, "de-esser {:.1} dB depth {:.1} dB", s.threshold_db, s.depth_db)
            }
            ChainStage::Limiter(p) => write!(
                f,
                "limiter {:.2} dB ({:.0} ms release, {:.0} ms lookahead)",
                p.ceiling_db, p.release_ms, p.lookahead_ms
            ),
        }
    }
}

/// A built chain: the pre-limiter stages in order plus the final limiter.
#[derive(Debug, Clone, PartialEq)]
pub struct MasteringChain {
    pre_limiter: Vec<ChainStage>,
    limiter: LimiterParams,
}

impl MasteringChain {
    /// Stages that run before the limiter.
    pub fn pre_limiter(&self) -> &[ChainStage] {
        &self.pre_limiter
    }

    /// Final limiter settings.
    pub fn limiter(&self) -> LimiterParams {
        self.limiter
    }

    /// Every stage in processing order, limiter last.
    pub fn stages(&self) -> impl Iterator<Item = ChainStage> + '_ {
        self.pre_limiter
            .iter()
            .copied()
            .chain(std::iter::once(ChainStage::Limiter(self.limiter)))
    }

    /// Number of stages including the limiter.
    pub fn len(&self) -> usize {
        self.pre_limiter.len() + 1
    }

    /// Always false: a chain ends in a limiter.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Run the stages before the limiter.
    pub fn apply_pre_limiter<B: DspBackend + ?Sized>(
        &self,
        backend: &B,
        signal: &SampleBuffer,
    ) -> SampleBuffer {
        self.pre_limiter.iter().fold(signal.clone(), |audio, stage| {
            tracing::debug!(stage = %stage, "applying stage");
            stage.apply(backend, &audio)
        })
    }

    /// Run the final limiter alone.
    pub fn limit<B: DspBackend + ?Sized>(&self, backend: &B, signal: &SampleBuffer) -> SampleBuffer {
        backend.apply_limiter(signal, &self.limiter)
    }

    /// Run the whole chain.
    pub fn apply<B: DspBackend + ?Sized>(&self, backend: &B, signal: &SampleBuffer) -> SampleBuffer {
        let pre = self.apply_pre_limiter(backend, signal);
        self.limit(backend, &pre)
    }
}

/// Build the chain for `decision`.
///
/// `loudness_delta_db` is added to the decision's broad gain. The
/// reference-match bank is only built in [`EqMode::ReferenceMatch`] and the
/// de-esser only in [`DeEsserMode::Auto`] when the decision carries settings.
pub fn build_chain(
    decision: &MasteringDecision,
    options: &MasteringOptions,
    loudness_delta_db: f32,
) -> MasteringChain {
    let preset = options.eq_preset;
    let mut stages = vec![
        ChainStage::HighPass {
            cutoff_hz: HIGHPASS_HZ,
        },
        ChainStage::Shelf {
            kind: ShelfKind::Low,
            frequency_hz: LOW_SHELF_HZ,
            gain_db: decision.low_shelf_gain_db + preset.low_shelf_offset_db(),
        },
        ChainStage::Shelf {
            kind: ShelfKind::High,
            frequency_hz: HIGH_SHELF_HZ,
            gain_db: decision.high_shelf_gain_db + preset.high_shelf_offset_db(),
        },
    ];

    if options.eq_mode == EqMode::ReferenceMatch {
        stages.extend(
            decision
                .band_corrections
                .iter()
                .map(|c| bank_stage(c, preset.band_bias_db(c.center_hz))),
        );
    }

    stages.push(ChainStage::Compressor(CompressorParams {
        threshold_db: decision.compressor_threshold_db,
        ratio: decision.compressor_ratio,
        attack_ms: COMPRESSOR_ATTACK_MS,
        release_ms: COMPRESSOR_RELEASE_MS,
    }));
    stages.push(ChainStage::Gain {
        gain_db: decision.gain_db + loudness_delta_db,
    });

    if options.de_esser_mode == DeEsserMode::Auto {
        if let Some(settings) = decision.de_esser {
            stages.push(ChainStage::DeEsser(settings));
        }
    }

    MasteringChain {
        pre_limiter: stages,
        limiter: LimiterParams {
            ceiling_db: decision.limiter_ceiling_db,
            release_ms: LIMITER_RELEASE_MS,
            lookahead_ms: LIMITER_LOOKAHEAD_MS,
        },
    }
}

fn bank_stage(correction: &EqBandCorrection, bias_db: f32) -> ChainStage {
    let center = correction.center_hz;
    let gain_db = correction.delta_db + bias_db;
    if center <= BANK_LOW_SHELF_MAX_HZ {
        ChainStage::Shelf {
            kind: ShelfKind::Low,
            frequency_hz: center.max(BANK_LOW_SHELF_FLOOR_HZ),
            gain_db,
        }
    } else if center >= BANK_HIGH_SHELF_MIN_HZ {
        ChainStage::Shelf {
            kind: ShelfKind::High,
            frequency_hz: center.min(BANK_HIGH_SHELF_CEILING_HZ),
            gain_db,
        }
    } else {
        ChainStage::Bell {
            frequency_hz: center,
            q: BANK_BELL_Q,
            gain_db,
        }
    }
}

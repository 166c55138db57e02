//! Core Effect trait.
//!
//! Every DSP stage in the mastering chain (filters, dynamics, gain) implements
//! [`Effect`]. Processing is per-sample so stages can be linked across
//! channels, and block helpers walk interleaved buffers for the offline
//! renderer.
//!
//! ## Design Decisions
//!
//! - **Stereo-aware**: [`Effect::process_stereo`] receives both channels of a
//!   frame. Dynamics processors override it to compute one gain from both
//!   channels so the stereo image does not shift.
//! - **Object-safe**: `dyn Effect` works for runtime-assembled chains.
//! - **No allocations** in the per-sample methods.

/// Core trait for all audio effects.
///
/// # Example
///
/// ```rust
/// use refmaster_core::Effect;
///
/// struct Trim {
///     gain: f32,
/// }
///
/// impl Effect for Trim {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut trim = Trim { gain: 0.5 };
/// let mut frames = [1.0, -1.0, 0.5, -0.5];
/// trim.process_interleaved(&mut frames, 2);
/// assert_eq!(frames, [0.5, -0.5, 0.25, -0.25]);
/// ```
pub trait Effect {
    /// Process a single mono sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process one stereo frame.
    ///
    /// The default runs [`process`](Self::process) on each channel, which is
    /// only correct for stateless effects. Stateful effects keep per-channel
    /// state and override this.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.process(left), self.process(right))
    }

    /// Process an interleaved buffer in place.
    ///
    /// Mono buffers go through [`process`](Self::process) and stereo buffers
    /// through [`process_stereo`](Self::process_stereo). Wider layouts are
    /// processed as consecutive stereo pairs, with a trailing odd channel
    /// handled as mono.
    fn process_interleaved(&mut self, samples: &mut [f32], channels: usize) {
        match channels {
            0 => {}
            1 => {
                for sample in samples.iter_mut() {
                    *sample = self.process(*sample);
                }
            }
            _ => {
                for frame in samples.chunks_exact_mut(channels) {
                    let mut pairs = frame.chunks_exact_mut(2);
                    for pair in &mut pairs {
                        let (l, r) = self.process_stereo(pair[0], pair[1]);
                        pair[0] = l;
                        pair[1] = r;
                    }
                    if let [last] = pairs.into_remainder() {
                        *last = self.process(*last);
                    }
                }
            }
        }
    }

    /// Update the sample rate and recompute rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state without changing parameters.
    fn reset(&mut self);

    /// Processing latency in samples.
    ///
    /// Offline renderers use this to realign the output; lookahead limiters
    /// are the only stage here with non-zero latency.
    fn latency_samples(&self) -> usize {
        0
    }
}

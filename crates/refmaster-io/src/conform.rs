//! Rate and layout conversion so two buffers can be compared sample for
//! sample.
//!
//! Resampling by the rational factor P/Q uses a polyphase windowed-sinc FIR:
//! the signal is conceptually upsampled by P, lowpassed at `0.9 / max(P, Q)`
//! of the upsampled Nyquist, and downsampled by Q, computing only the output
//! samples actually needed. The prototype filter's group delay is folded into
//! the output phase, so output sample `m` lines up with input time `m·Q/P`.
//!
//! ```text
//! h[n] = sinc(cutoff * (n - M/2)) * blackman[n]          (sum h = 1)
//! y[m] = P * Σ_i h[k + i·P] * x[j - i],  t = m·Q + M/2,  j = t / P,  k = t % P
//! ```

use std::f32::consts::PI;

use refmaster_core::SampleBuffer;

use crate::{Error, Result};

/// Prototype taps per polyphase branch (times 4, plus one).
const TAPS_PER_PHASE_QUARTER: usize = 10;

/// Windowed-sinc lowpass, Blackman window, unity DC gain.
///
/// `cutoff` is normalized to Nyquist (1.0 = fs/2).
fn design_lowpass(num_taps: usize, cutoff: f32) -> Vec<f32> {
    if num_taps == 0 {
        return Vec::new();
    }
    let m = num_taps - 1;
    let mut coeffs: Vec<f32> = (0..num_taps)
        .map(|n| {
            let x = n as f32 - m as f32 / 2.0;
            let sinc = if x.abs() < 1e-7 {
                cutoff
            } else {
                (PI * cutoff * x).sin() / (PI * x)
            };
            let window = if m == 0 {
                1.0
            } else {
                let phase = 2.0 * PI * n as f32 / m as f32;
                0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
            };
            sinc * window
        })
        .collect();

    let sum: f32 = coeffs.iter().sum();
    if sum.abs() > 1e-10 {
        for c in &mut coeffs {
            *c /= sum;
        }
    }
    coeffs
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Resample one channel from `from_rate` to `to_rate`.
///
/// The output holds `ceil(len · to / from)` samples and is time-aligned with
/// the input. Equal rates return the input unchanged.
pub fn resample(signal: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || signal.is_empty() {
        return signal.to_vec();
    }
    let g = gcd(u64::from(from_rate), u64::from(to_rate));
    let p = (u64::from(to_rate) / g) as usize;
    let q = (u64::from(from_rate) / g) as usize;

    let num_taps = 4 * p.max(q) * TAPS_PER_PHASE_QUARTER + 1;
    let prototype = design_lowpass(num_taps, 0.9 / p.max(q) as f32);
    let delay = (num_taps - 1) / 2;

    let taps_per_phase = num_taps.div_ceil(p);
    let mut polyphase = vec![vec![0.0f32; taps_per_phase]; p];
    for (tap, &coeff) in prototype.iter().enumerate() {
        polyphase[tap % p][tap / p] = coeff;
    }

    let out_len = (signal.len() * p).div_ceil(q);
    let gain = p as f32;
    (0..out_len)
        .map(|m| {
            let t = m * q + delay;
            let j = t / p;
            let branch = &polyphase[t % p];
            let acc: f32 = branch
                .iter()
                .enumerate()
                .filter_map(|(i, &c)| {
                    j.checked_sub(i)
                        .and_then(|n| signal.get(n))
                        .map(|&x| c * x)
                })
                .sum();
            acc * gain
        })
        .collect()
}

/// Convert between mono and stereo: mono is duplicated, stereo is averaged.
///
/// # Errors
///
/// [`Error::UnsupportedChannels`] unless both layouts are mono or stereo.
pub fn remix(buffer: &SampleBuffer, channels: u16) -> Result<SampleBuffer> {
    for count in [buffer.channels(), channels] {
        if !(1..=2).contains(&count) {
            return Err(Error::UnsupportedChannels(count));
        }
    }
    let samples = match (buffer.channels(), channels) {
        (1, 2) => buffer.samples().iter().flat_map(|&s| [s, s]).collect(),
        (2, 1) => buffer.to_mono(),
        _ => return Ok(buffer.clone()),
    };
    Ok(SampleBuffer::new(samples, buffer.sample_rate(), channels)?)
}

/// Bring `buffer` to `sample_rate` and `channels`, clipping the result to ±1.
///
/// # Errors
///
/// [`Error::UnsupportedChannels`] for layouts other than mono or stereo, and
/// [`Error::InvalidBuffer`] for a zero target rate.
pub fn conform(buffer: &SampleBuffer, sample_rate: u32, channels: u16) -> Result<SampleBuffer> {
    let remixed = remix(buffer, channels)?;
    if remixed.sample_rate() == sample_rate {
        return Ok(remixed.map(|s| s.clamp(-1.0, 1.0)));
    }

    tracing::debug!(
        from = remixed.sample_rate(),
        to = sample_rate,
        channels,
        "resampling"
    );
    let planes: Vec<Vec<f32>> = (0..channels as usize)
        .map(|ch| {
            resample(&remixed.channel(ch), remixed.sample_rate(), sample_rate)
                .into_iter()
                .map(|s| s.clamp(-1.0, 1.0))
                .collect()
        })
        .collect();
    Ok(SampleBuffer::from_planar(&planes, sample_rate)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, rate: u32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_design_lowpass_unity_dc() {
        for &num_taps in &[11usize, 41, 81] {
            let sum: f32 = design_lowpass(num_taps, 0.3).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_resample_length() {
        let out = resample(&vec![0.0; 44100], 44100, 48000);
        assert_eq!(out.len(), 48000);
        let out = resample(&vec![0.0; 1000], 48000, 32000);
        assert_eq!(out.len(), 667);
    }

    #[test]
    fn test_resample_is_time_aligned() {
        // 1 kHz at 44.1 kHz → 48 kHz must match a 1 kHz sine generated
        // directly at 48 kHz, away from the edges.
        let input = sine(1000.0, 44100, 44100);
        let output = resample(&input, 44100, 48000);
        let expected = sine(1000.0, 48000, output.len());
        for i in 2000..output.len() - 2000 {
            assert!(
                (output[i] - expected[i]).abs() < 5e-3,
                "sample {i}: {} vs {}",
                output[i],
                expected[i]
            );
        }
    }

    #[test]
    fn test_downsample_removes_content_above_new_nyquist() {
        let input = sine(20000.0, 48000, 48000);
        let output = resample(&input, 48000, 32000);
        let rms = (output[1000..output.len() - 1000]
            .iter()
            .map(|s| s * s)
            .sum::<f32>()
            / (output.len() - 2000) as f32)
            .sqrt();
        assert!(rms < 0.01, "rms {rms}");
    }

    #[test]
    fn test_remix() {
        let mono = SampleBuffer::from_mono(vec![0.1, 0.2], 48000).unwrap();
        let stereo = remix(&mono, 2).unwrap();
        assert_eq!(stereo.samples(), &[0.1, 0.1, 0.2, 0.2]);

        let wide = SampleBuffer::new(vec![0.2, 0.4, -0.2, 0.0], 48000, 2).unwrap();
        let folded = remix(&wide, 1).unwrap();
        assert_eq!(folded.channels(), 1);
        assert!((folded.samples()[0] - 0.3).abs() < 1e-6);
        assert!((folded.samples()[1] + 0.1).abs() < 1e-6);

        let surround = SampleBuffer::new(vec![0.0; 12], 48000, 6).unwrap();
        assert!(matches!(remix(&surround, 2), Err(Error::UnsupportedChannels(6))));
        assert!(matches!(remix(&mono, 3), Err(Error::UnsupportedChannels(3))));
    }

    #[test]
    fn test_conform_rate_and_layout() {
        let mono = SampleBuffer::from_mono(sine(440.0, 44100, 44100), 44100).unwrap();
        let conformed = conform(&mono, 48000, 2).unwrap();
        assert_eq!(conformed.sample_rate(), 48000);
        assert_eq!(conformed.channels(), 2);
        assert_eq!(conformed.frames(), 48000);
        assert_eq!(conformed.channel(0), conformed.channel(1));
    }

    #[test]
    fn test_conform_clips() {
        let hot = SampleBuffer::from_mono(vec![1.5, -2.0, 0.5], 48000).unwrap();
        let conformed = conform(&hot, 48000, 1).unwrap();
        assert_eq!(conformed.samples(), &[1.0, -1.0, 0.5]);
    }
}

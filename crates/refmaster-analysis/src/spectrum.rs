//! Welch-averaged power spectra and spectral shape descriptors.
//!
//! A [`Spectrum`] holds the mean power per FFT bin across Hann-windowed
//! frames with 50 % overlap, plus one end-aligned frame when the hops stop short
//! of the last sample. Signals shorter than one frame are windowed over their
//! own length and zero-padded into a single frame, so every non-empty input
//! yields a spectrum with `fft_size / 2 + 1` bins.

use crate::fft::{Fft, Window};

/// Frame length used for whole-track analysis.
pub const ANALYSIS_FFT_SIZE: usize = 8192;

/// Frames shorter than this are left unwindowed; a Hann window over a
/// handful of samples zeroes most of them.
pub const MIN_WINDOWED_LEN: usize = 16;

/// Power spectrum with its bin spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    power: Vec<f32>,
    bin_hz: f32,
}

impl Spectrum {
    /// Welch power spectrum of `signal` using frames of `fft_size` samples.
    ///
    /// Power is normalized by the window energy so values are comparable
    /// between signals of different length. An empty signal yields an
    /// all-zero spectrum.
    pub fn welch(signal: &[f32], sample_rate: f32, fft_size: usize) -> Self {
        let fft_size = fft_size.max(2);
        let fft = Fft::new(fft_size);
        let bins = fft_size / 2 + 1;
        let bin_hz = sample_rate / fft_size as f32;
        let mut power = vec![0.0_f32; bins];

        if signal.is_empty() {
            return Self { power, bin_hz };
        }

        let frame_len = signal.len().min(fft_size);
        let window_kind = if frame_len < MIN_WINDOWED_LEN {
            Window::Rectangular
        } else {
            Window::Hann
        };
        let window = window_kind.coefficients(frame_len);
        let window_energy: f32 = window.iter().map(|w| w * w).sum::<f32>().max(1e-12);
        let hop = (fft_size / 2).max(1);

        let mut frame = vec![0.0_f32; frame_len];
        let mut accumulate = |start: usize| {
            let segment = &signal[start..start + frame_len];
            for ((dst, &x), &w) in frame.iter_mut().zip(segment).zip(&window) {
                *dst = x * w;
            }
            for (p, c) in power.iter_mut().zip(fft.forward(&frame)) {
                *p += c.norm_sqr() / window_energy;
            }
        };

        let mut frames = 0usize;
        let mut start = 0usize;
        while start + frame_len <= signal.len() {
            accumulate(start);
            frames += 1;
            start += hop;
        }
        // Hops rarely land on the end; one end-aligned frame covers the tail.
        let covered = start - hop + frame_len;
        if covered < signal.len() {
            accumulate(signal.len() - frame_len);
            frames += 1;
        }

        let scale = 1.0 / frames.max(1) as f32;
        for p in &mut power {
            *p *= scale;
        }
        Self { power, bin_hz }
    }

    /// Power per bin, DC to Nyquist.
    pub fn power(&self) -> &[f32] {
        &self.power
    }

    /// Frequency spacing between bins in Hz.
    pub fn bin_hz(&self) -> f32 {
        self.bin_hz
    }

    /// Centre frequency of bin `index`.
    pub fn frequency(&self, index: usize) -> f32 {
        index as f32 * self.bin_hz
    }

    /// Magnitude (square root of power) per bin.
    pub fn magnitudes(&self) -> Vec<f32> {
        self.power.iter().map(|p| p.sqrt()).collect()
    }

    /// Total power over all bins.
    pub fn total_power(&self) -> f32 {
        self.power.iter().sum()
    }

    /// Summed power of bins with `low_hz <= f < high_hz`.
    pub fn band_power(&self, low_hz: f32, high_hz: f32) -> f32 {
        self.bins_in(low_hz, high_hz).map(|(_, p)| p).sum()
    }

    /// Mean power of bins with `low_hz <= f < high_hz`, zero when the band
    /// holds no bins.
    pub fn band_mean_power(&self, low_hz: f32, high_hz: f32) -> f32 {
        let (count, sum) = self
            .bins_in(low_hz, high_hz)
            .fold((0usize, 0.0_f32), |(n, s), (_, p)| (n + 1, s + p));
        if count == 0 { 0.0 } else { sum / count as f32 }
    }

    /// Fraction of total power in `low_hz <= f < high_hz`; zero for silence.
    pub fn band_fraction(&self, low_hz: f32, high_hz: f32) -> f32 {
        let total = self.total_power();
        if total > 1e-20 {
            self.band_power(low_hz, high_hz) / total
        } else {
            0.0
        }
    }

    /// Magnitude-weighted mean frequency in Hz; zero for silence.
    pub fn centroid(&self) -> f32 {
        let mut weighted_sum = 0.0;
        let mut magnitude_sum = 0.0;
        for (i, p) in self.power.iter().enumerate() {
            let mag = p.sqrt();
            weighted_sum += self.frequency(i) * mag;
            magnitude_sum += mag;
        }
        if magnitude_sum > 1e-10 {
            weighted_sum / magnitude_sum
        } else {
            0.0
        }
    }

    /// First frequency at which the cumulative magnitude reaches `fraction`
    /// of the total; zero for silence.
    pub fn rolloff(&self, fraction: f32) -> f32 {
        let magnitudes = self.magnitudes();
        let total: f32 = magnitudes.iter().sum();
        if total <= 1e-10 {
            return 0.0;
        }
        let threshold = total * fraction.clamp(0.0, 1.0);
        let mut cumulative = 0.0;
        for (i, mag) in magnitudes.iter().enumerate() {
            cumulative += mag;
            if cumulative >= threshold {
                return self.frequency(i);
            }
        }
        self.frequency(magnitudes.len() - 1)
    }

    fn bins_in(&self, low_hz: f32, high_hz: f32) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.power
            .iter()
            .enumerate()
            .filter(move |(i, _)| {
                let f = self.frequency(*i);
                f >= low_hz && f < high_hz
            })
            .map(|(i, &p)| (i, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sr: f64, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sr).sin() as f32)
            .collect()
    }

    #[test]
    fn test_tone_lands_in_its_band() {
        let spectrum = Spectrum::welch(&sine(1000.0, 48000.0, 48000), 48000.0, ANALYSIS_FFT_SIZE);
        assert!(spectrum.band_fraction(900.0, 1100.0) > 0.99);
        assert!((spectrum.centroid() - 1000.0).abs() < 100.0);
    }

    #[test]
    fn test_short_signal_is_zero_padded() {
        let spectrum = Spectrum::welch(&sine(3000.0, 48000.0, 1000), 48000.0, ANALYSIS_FFT_SIZE);
        assert_eq!(spectrum.power().len(), ANALYSIS_FFT_SIZE / 2 + 1);
        assert!(spectrum.band_fraction(2500.0, 3500.0) > 0.95);
    }

    #[test]
    fn test_silence_is_all_zero() {
        let spectrum = Spectrum::welch(&vec![0.0; 10000], 48000.0, 1024);
        assert_eq!(spectrum.total_power(), 0.0);
        assert_eq!(spectrum.centroid(), 0.0);
        assert_eq!(spectrum.rolloff(0.85), 0.0);
        assert_eq!(spectrum.band_fraction(0.0, 1000.0), 0.0);
    }

    #[test]
    fn test_rolloff_between_two_tones() {
        let mut signal = sine(200.0, 48000.0, 48000);
        for (s, t) in signal.iter_mut().zip(sine(8000.0, 48000.0, 48000)) {
            *s = 0.5 * *s + 0.5 * t;
        }
        let spectrum = Spectrum::welch(&signal, 48000.0, 4096);
        let rolloff = spectrum.rolloff(0.85);
        assert!(rolloff > 7000.0 && rolloff < 9000.0, "rolloff {rolloff}");
    }

    #[test]
    fn test_band_mean_power_empty_band() {
        let spectrum = Spectrum::welch(&sine(1000.0, 48000.0, 4096), 48000.0, 4096);
        assert_eq!(spectrum.band_mean_power(1000.0, 1000.0), 0.0);
    }

    #[test]
    fn test_tail_after_last_hop_is_analyzed() {
        let mut signal = sine(100.0, 48000.0, 8192);
        signal.extend(sine(7000.0, 48000.0, 4000));
        let spectrum = Spectrum::welch(&signal, 48000.0, ANALYSIS_FFT_SIZE);
        let tail = spectrum.band_fraction(5000.0, 10000.0);
        assert!(tail > 0.1, "tail fraction {tail}");
    }

    #[test]
    fn test_two_sample_signal_keeps_its_energy() {
        let spectrum = Spectrum::welch(&[0.5, -0.5], 48000.0, ANALYSIS_FFT_SIZE);
        assert!(spectrum.total_power() > 0.0);
        let sum = spectrum.band_fraction(0.0, 200.0)
            + spectrum.band_fraction(200.0, 4000.0)
            + spectrum.band_fraction(4000.0, 24001.0);
        assert!((sum - 1.0).abs() < 1e-4, "fractions sum to {sum}");
    }
}

//! Integration tests for refmaster-analysis.
//!
//! Exercise the public API with synthetic signals whose descriptors are known
//! in advance.

use std::f64::consts::PI;

use proptest::prelude::*;
use refmaster_analysis::{
    TrackAnalysis, analyze, analyze_temporal, integrated_loudness, true_peak_dbtp,
};
use refmaster_core::SampleBuffer;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Stereo buffer with a different tone on each channel.
fn stereo_tones(left_hz: f64, right_hz: f64, amplitude: f32, seconds: f64) -> SampleBuffer {
    let frames = (48000.0 * seconds) as usize;
    let samples = (0..frames)
        .flat_map(|i| {
            let t = i as f64 / 48000.0;
            [
                amplitude * (2.0 * PI * left_hz * t).sin() as f32,
                amplitude * (2.0 * PI * right_hz * t).sin() as f32,
            ]
        })
        .collect();
    SampleBuffer::new(samples, 48000, 2).unwrap()
}

/// Deterministic white-ish noise from a linear congruential generator.
fn noise(frames: usize, amplitude: f32, seed: u32) -> Vec<f32> {
    let mut state = seed;
    (0..frames)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            amplitude * ((state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0)
        })
        .collect()
}

// ===========================================================================
// Track analysis
// ===========================================================================

#[test]
fn stereo_mixdown_sees_both_channels() {
    let analysis = analyze(&stereo_tones(60.0, 6000.0, 0.5, 1.0)).unwrap();
    assert!(analysis.low_band_energy > 0.4);
    assert!(analysis.high_band_energy > 0.4);
    assert!(analysis.mid_band_energy < 0.05);
}

#[test]
fn noise_is_bright_and_balanced() {
    let buffer = SampleBuffer::from_mono(noise(96000, 0.3, 7), 48000).unwrap();
    let analysis = analyze(&buffer).unwrap();
    // White noise spreads power evenly up to Nyquist: most of it sits
    // above 4 kHz.
    assert!(analysis.high_band_energy > 0.75);
    assert!(analysis.spectral_centroid_hz > 9000.0);
    assert!(analysis.spectral_rolloff_hz > 15000.0);
}

#[test]
fn track_analysis_serializes_to_json() {
    let analysis = analyze(&stereo_tones(440.0, 440.0, 0.25, 0.5)).unwrap();
    let json = serde_json::to_string(&analysis).unwrap();
    assert!(json.contains("\"spectral_centroid_hz\""));
    let back: TrackAnalysis = serde_json::from_str(&json).unwrap();
    assert_eq!(back, analysis);
}

// ===========================================================================
// Loudness and true peak
// ===========================================================================

#[test]
fn loudness_tracks_gain() {
    let quiet = stereo_tones(1000.0, 1000.0, 0.1, 2.0);
    let loud = quiet.map(|s| s * 4.0);
    let delta = integrated_loudness(&loud).unwrap() - integrated_loudness(&quiet).unwrap();
    assert!((delta - 12.04).abs() < 0.1, "delta {delta}");
}

#[test]
fn true_peak_never_below_sample_peak() {
    let buffer = SampleBuffer::from_mono(noise(4800, 0.8, 3), 48000).unwrap();
    let sample_peak_db = 20.0 * buffer.peak().log10();
    assert!(true_peak_dbtp(&buffer, 4) >= sample_peak_db - 1e-3);
}

// ===========================================================================
// Temporal analysis
// ===========================================================================

#[test]
fn temporal_band_energies_follow_content() {
    let buffer = stereo_tones(100.0, 100.0, 0.5, 1.0);
    let analysis = analyze_temporal(&buffer, &[20.0, 250.0, 4000.0, 16000.0]).unwrap();
    for frame in &analysis.frames {
        assert!(frame.band_energies[0] > 0.95);
    }
    assert!((analysis.mean_crest_db - 3.01).abs() < 0.1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Band fractions are bounded and sum to one for any audible signal.
    #[test]
    fn band_fractions_partition_power(
        seed in 1u32..10_000,
        amplitude in 0.05f32..1.0,
    ) {
        let buffer = SampleBuffer::from_mono(noise(8192, amplitude, seed), 44100).unwrap();
        let a = analyze(&buffer).unwrap();
        for v in [a.low_band_energy, a.mid_band_energy, a.high_band_energy, a.sibilance_ratio] {
            prop_assert!((0.0..=1.0 + 1e-5).contains(&v));
        }
        let sum = a.low_band_energy + a.mid_band_energy + a.high_band_energy;
        prop_assert!((sum - 1.0).abs() < 1e-3);
    }
}

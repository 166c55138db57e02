//! Dynamics descriptors: RMS level, peak and crest factor.

/// Floor reported for zero-energy signals, in dB.
pub const SILENCE_FLOOR_DB: f32 = -96.0;

/// Compute RMS (Root Mean Square) level of a signal
///
/// Returns RMS value in linear scale (not dB)
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }

    // Accumulate in f64: whole tracks run to tens of millions of samples.
    let sum_sq: f64 = signal.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    (sum_sq / signal.len() as f64).sqrt() as f32
}

/// RMS level in dB, floored at [`SILENCE_FLOOR_DB`].
pub fn rms_db(signal: &[f32]) -> f32 {
    to_db_floored(rms(signal))
}

/// Compute peak level (maximum absolute value)
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0_f32, |acc, x| acc.max(x.abs()))
}

/// Peak level in dB, floored at [`SILENCE_FLOOR_DB`].
pub fn peak_db(signal: &[f32]) -> f32 {
    to_db_floored(peak(signal))
}

/// Crest factor in dB: `20·log10((peak + 1e-12) / (rms + 1e-12))`.
///
/// Silence yields 0 dB. Typical values: sine ≈ 3 dB, mixed music 12–18 dB,
/// heavily limited masters 6–9 dB.
pub fn crest_factor_db(signal: &[f32]) -> f32 {
    let ratio = (f64::from(peak(signal)) + 1e-12) / (f64::from(rms(signal)) + 1e-12);
    (20.0 * ratio.log10()) as f32
}

/// Convert a linear amplitude to dB, floored at [`SILENCE_FLOOR_DB`].
pub fn to_db_floored(linear: f32) -> f32 {
    if linear > 0.0 {
        (20.0 * linear.log10()).max(SILENCE_FLOOR_DB)
    } else {
        SILENCE_FLOOR_DB
    }
}

//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use refmaster_config::{ConfigError, MasteringProfile, load_profile as config_load_profile};
use refmaster_core::SampleBuffer;
use refmaster_io::{WavSpec, read_wav};
use std::path::Path;

/// Load a profile by factory name, alias, path or user profile name.
pub fn load_profile(name: &str) -> anyhow::Result<MasteringProfile> {
    match config_load_profile(name) {
        Ok(profile) => Ok(profile),
        Err(ConfigError::ProfileNotFound(_)) => anyhow::bail!(
            "Profile '{}' not found. Use 'refmaster profiles' to see available profiles.",
            name
        ),
        Err(e) => Err(e).with_context(|| format!("failed to load profile '{name}'")),
    }
}

/// Read a WAV file, naming it in any error.
pub fn read_input(path: &Path) -> anyhow::Result<(SampleBuffer, WavSpec)> {
    read_wav(path).with_context(|| format!("failed to read {}", path.display()))
}

/// One-line description of a buffer's format.
pub fn describe(buffer: &SampleBuffer, spec: &WavSpec) -> String {
    format!(
        "{} frames, {} Hz, {} ch, {}-bit, {:.2}s",
        buffer.frames(),
        buffer.sample_rate(),
        buffer.channels(),
        spec.bits_per_sample,
        buffer.duration_secs()
    )
}

/// Format a level for display, showing `-inf` for silence.
pub fn fmt_db(value: f32) -> String {
    if value.is_finite() {
        format!("{value:.1}")
    } else {
        "-inf".to_string()
    }
}

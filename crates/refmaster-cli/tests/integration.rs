//! Integration tests for refmaster-cli.
//!
//! Tests cover the CLI binary invocation and end-to-end mastering of WAV
//! files written to a temporary directory.

use refmaster_core::SampleBuffer;
use refmaster_io::{read_wav, write_wav};
use std::path::Path;
use std::process::Command;

/// Helper to get the path to the `refmaster` binary built by cargo.
fn refmaster_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_refmaster"))
}

fn write_tone(path: &Path, sample_rate: u32, channels: u16, level: f32, seconds: f32) {
    let frames = (seconds * sample_rate as f32) as usize;
    let plane: Vec<f32> = (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            level
                * (0.7 * (2.0 * std::f32::consts::PI * 220.0 * t).sin()
                    + 0.3 * (2.0 * std::f32::consts::PI * 3000.0 * t).sin())
        })
        .collect();
    let planes = vec![plane; channels as usize];
    let buffer = SampleBuffer::from_planar(&planes, sample_rate).unwrap();
    write_wav(path, &buffer, 24).unwrap();
}

// ---------------------------------------------------------------------------
// `refmaster profiles`
// ---------------------------------------------------------------------------

#[test]
fn cli_profiles_lists_factory_profiles_and_aliases() {
    let output = refmaster_bin()
        .arg("profiles")
        .output()
        .expect("failed to run refmaster profiles");

    assert!(output.status.success(), "refmaster profiles failed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["default", "conservative", "aggressive", "streaming-loud", "vocal-presence"] {
        assert!(stdout.contains(name), "listing should contain '{name}'");
    }
}

#[test]
fn cli_profiles_show_prints_toml() {
    let output = refmaster_bin()
        .args(["profiles", "--show", "streaming-loud"])
        .output()
        .expect("failed to run refmaster profiles --show");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name = \"aggressive\""));
    assert!(stdout.contains("[loudness]"));
}

#[test]
fn cli_profiles_export_writes_loadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conservative.toml");

    let output = refmaster_bin()
        .args(["profiles", "--export", "conservative", "--output"])
        .arg(&path)
        .output()
        .expect("failed to run refmaster profiles --export");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let profile = refmaster_config::MasteringProfile::load(&path).unwrap();
    assert_eq!(profile.name, "conservative");
}

#[test]
fn cli_profiles_show_unknown_fails() {
    let output = refmaster_bin()
        .args(["profiles", "--show", "no-such-profile"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// `refmaster analyze`
// ---------------------------------------------------------------------------

#[test]
fn cli_analyze_json_reports_loudness() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    write_tone(&input, 48000, 2, 0.5, 2.0);

    let output = refmaster_bin()
        .args(["analyze", "--json"])
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["channels"], 2);
    assert_eq!(report["sample_rate"], 48000);
    let lufs = report["analysis"]["integrated_lufs"].as_f64().unwrap();
    assert!(lufs < -3.0 && lufs > -20.0, "lufs {lufs}");
    assert!(report["temporal"]["frames"].as_array().unwrap().is_empty());
}

#[test]
fn cli_analyze_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    write_tone(&input, 44100, 1, 0.3, 1.0);

    let output = refmaster_bin().arg("analyze").arg(&input).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("LUFS"));
    assert!(stdout.contains("dBTP"));
    assert!(stdout.contains("Band energy"));
}

#[test]
fn cli_analyze_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = refmaster_bin()
        .arg("analyze")
        .arg(dir.path().join("missing.wav"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

// ---------------------------------------------------------------------------
// `refmaster master`
// ---------------------------------------------------------------------------

#[test]
fn cli_master_end_to_end_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("mix.wav");
    let reference = dir.path().join("reference.wav");
    let mastered = dir.path().join("mastered.wav");
    let report = dir.path().join("report.json");

    write_tone(&target, 48000, 2, 0.05, 3.0);
    // Different rate and layout: the CLI conforms the reference first.
    write_tone(&reference, 44100, 1, 0.6, 3.0);

    let output = refmaster_bin()
        .arg("master")
        .args([&target, &reference, &mastered])
        .args(["--eq-mode", "reference-match", "--de-esser", "auto", "--report"])
        .arg(&report)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let (buffer, spec) = read_wav(&mastered).unwrap();
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(buffer.frames(), 144000);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    let input_lufs = json["input_lufs"].as_f64().unwrap();
    let output_lufs = json["output_lufs"].as_f64().unwrap();
    assert!(output_lufs > input_lufs, "{output_lufs} <= {input_lufs}");
    assert_eq!(json["applied_chain"]["eq_mode"], "reference-match");
    assert!(json["convergence"]["outcome"].is_string());
}

#[test]
fn cli_master_rejects_invalid_option() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("mix.wav");
    write_tone(&target, 48000, 1, 0.1, 0.5);

    let output = refmaster_bin()
        .arg("master")
        .args([&target, &target, &dir.path().join("out.wav")])
        .args(["--eq-mode", "loud"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fixed, reference-match"), "stderr: {stderr}");
}

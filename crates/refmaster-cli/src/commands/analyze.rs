//! Track analysis command.

use super::common::{describe, fmt_db, load_profile, read_input};
use clap::Args;
use refmaster_analysis::{TemporalAnalysis, TrackAnalysis, analyze, analyze_temporal, true_peak_dbtp};
use serde::Serialize;
use std::path::PathBuf;

/// Oversampling factor for the reported true peak.
const TRUE_PEAK_FACTOR: usize = 4;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Profile whose band layout is used for the short-time band energies
    #[arg(short, long, default_value = "default")]
    profile: String,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,

    /// Include every short-time frame in the JSON output
    #[arg(long, requires = "json")]
    frames: bool,
}

#[derive(Serialize)]
struct AnalyzeReport {
    file: String,
    sample_rate: u32,
    channels: u16,
    duration_secs: f64,
    true_peak_dbtp: f32,
    analysis: TrackAnalysis,
    temporal: TemporalAnalysis,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let profile = load_profile(&args.profile)?;
    let (buffer, spec) = read_input(&args.input)?;

    let analysis = analyze(&buffer)?;
    let mut temporal = analyze_temporal(&buffer, &profile.analysis.band_edges_hz)?;
    let true_peak = true_peak_dbtp(&buffer, TRUE_PEAK_FACTOR);

    if args.json {
        tracing::debug!(frames = temporal.frames.len(), "temporal analysis");
        if !args.frames {
            temporal.frames.clear();
        }
        let report = AnalyzeReport {
            file: args.input.display().to_string(),
            sample_rate: buffer.sample_rate(),
            channels: buffer.channels(),
            duration_secs: buffer.duration_secs(),
            true_peak_dbtp: true_peak,
            analysis,
            temporal,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", args.input.display());
    println!("  {}", describe(&buffer, &spec));

    println!("\nLevel:");
    println!("  Integrated:  {} LUFS", fmt_db(analysis.integrated_lufs));
    println!("  RMS:         {} dB", fmt_db(analysis.rms_db));
    println!("  Sample peak: {} dBFS", fmt_db(analysis.sample_peak_db));
    println!("  True peak:   {} dBTP", fmt_db(true_peak));
    println!("  Crest:       {:.1} dB", analysis.crest_factor_db);
    if analysis.is_clipping {
        println!("  (clipping detected)");
    }
    if analysis.is_silent {
        println!("  (silent)");
    }

    println!("\nSpectrum:");
    println!("  Centroid:    {:.0} Hz", analysis.spectral_centroid_hz);
    println!("  Rolloff:     {:.0} Hz", analysis.spectral_rolloff_hz);
    println!(
        "  Low/Mid/High energy: {:.1}% / {:.1}% / {:.1}%",
        analysis.low_band_energy * 100.0,
        analysis.mid_band_energy * 100.0,
        analysis.high_band_energy * 100.0
    );
    println!("  Sibilance:   {:.1}%", analysis.sibilance_ratio * 100.0);

    println!("\nOver time ({} frames):", temporal.frames.len());
    println!(
        "  Loudness: mean {} dB, range {} .. {} dB",
        fmt_db(temporal.mean_loudness_db),
        fmt_db(temporal.min_loudness_db),
        fmt_db(temporal.peak_loudness_db)
    );
    println!("  Crest:    mean {:.1} dB", temporal.mean_crest_db);
    println!("  Transient density: {:.2}%", temporal.mean_transient_density * 100.0);

    println!("\n  Band energy (mean over frames):");
    for (edges, share) in temporal
        .band_edges_hz
        .windows(2)
        .zip(mean_band_energies(&temporal))
    {
        println!("    {:>6.0} - {:<6.0} Hz  {:5.1}%", edges[0], edges[1], share * 100.0);
    }

    Ok(())
}

/// Per-band energy share averaged over all frames.
fn mean_band_energies(temporal: &TemporalAnalysis) -> Vec<f32> {
    let bands = temporal.band_edges_hz.len().saturating_sub(1);
    let mut sums = vec![0.0f32; bands];
    for frame in &temporal.frames {
        for (sum, e) in sums.iter_mut().zip(&frame.band_energies) {
            *sum += e;
        }
    }
    let count = temporal.frames.len().max(1) as f32;
    sums.iter().map(|s| s / count).collect()
}

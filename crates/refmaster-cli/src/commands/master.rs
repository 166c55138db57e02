//! Reference-based mastering of a WAV file.

use super::common::{describe, fmt_db, load_profile, read_input};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use refmaster_config::{DeEsserMode, EqMode, EqPreset, MasteringOptions};
use refmaster_engine::{MasteringDiagnostics, MasteringEngine};
use refmaster_io::{conform, write_wav};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args)]
pub struct MasterArgs {
    /// Mix to be mastered (WAV)
    #[arg(value_name = "TARGET")]
    target: PathBuf,

    /// Reference track to match (WAV)
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// Mastered output file (WAV)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Profile name, alias or TOML path (defaults to the EQ preset's profile)
    #[arg(short, long)]
    profile: Option<String>,

    /// EQ mode: fixed or reference-match
    #[arg(long, default_value = "fixed")]
    eq_mode: EqMode,

    /// Tonal preset: neutral, warm, bright, vocal-presence, bass-boost
    #[arg(long, default_value = "neutral")]
    eq_preset: EqPreset,

    /// De-esser: off or auto
    #[arg(long, default_value = "off")]
    de_esser: DeEsserMode,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Write the diagnostics report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

pub fn run(args: MasterArgs) -> anyhow::Result<()> {
    let profile_name = args
        .profile
        .as_deref()
        .unwrap_or_else(|| args.eq_preset.default_profile());
    let profile = load_profile(profile_name)?;
    let options = MasteringOptions::default()
        .with_eq_mode(args.eq_mode)
        .with_eq_preset(args.eq_preset)
        .with_de_esser_mode(args.de_esser);

    println!("Reading {}...", args.target.display());
    let (target, target_spec) = read_input(&args.target)?;
    println!("  {}", describe(&target, &target_spec));

    println!("Reading {}...", args.reference.display());
    let (reference, reference_spec) = read_input(&args.reference)?;
    println!("  {}", describe(&reference, &reference_spec));

    let reference = if reference.same_format(&target) {
        reference
    } else {
        tracing::info!(
            from_rate = reference.sample_rate(),
            from_channels = reference.channels(),
            to_rate = target.sample_rate(),
            to_channels = target.channels(),
            "conforming reference to target format"
        );
        conform(&reference, target.sample_rate(), target.channels())
            .context("failed to conform reference")?
    };

    println!(
        "Mastering with profile '{}' (eq {}, preset {}, de-esser {})...",
        profile.name, options.eq_mode, options.eq_preset, options.de_esser_mode
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")?);
    spinner.set_message("analyzing and mastering");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let engine = MasteringEngine::new(profile, options);
    let result = engine.master(&target, &reference);
    spinner.finish_and_clear();
    let outcome = result.context("mastering failed")?;

    print_summary(&outcome.diagnostics);

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &outcome.output, args.bit_depth)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if let Some(report) = &args.report {
        let json = outcome.diagnostics.to_json()?;
        std::fs::write(report, json)
            .with_context(|| format!("failed to write report {}", report.display()))?;
        println!("Report written to {}", report.display());
    }

    println!("Done!");
    Ok(())
}

fn print_summary(d: &MasteringDiagnostics) {
    let chain = &d.applied_chain;

    println!("\nLoudness:");
    println!("  Input:     {} LUFS", fmt_db(d.input_lufs));
    println!("  Reference: {} LUFS", fmt_db(d.reference_lufs));
    println!("  Output:    {} LUFS", fmt_db(d.output_lufs));
    println!(
        "  Loop:      {} after {} measurement(s), offset {:+.2} dB",
        d.convergence.outcome.as_str(),
        d.convergence.measurements,
        d.convergence.gain_offset_db
    );

    println!("\nTrue peak:");
    println!(
        "  {} dBTP (target {:.1}, margin {:+.2} dB){}",
        fmt_db(d.true_peak.final_dbtp),
        d.true_peak.target_dbtp,
        d.true_peak.margin_db,
        if d.true_peak.trimmed {
            format!(", trimmed {:.2} dB", d.true_peak.trim_db)
        } else {
            String::new()
        }
    );

    println!("\nChain:");
    println!("  Gain:        {:+.2} dB (loudness {:+.2} dB)", chain.gain_db, chain.loudness_gain_db);
    println!("  Low shelf:   {:+.2} dB", chain.low_shelf_gain_db);
    println!("  High shelf:  {:+.2} dB", chain.high_shelf_gain_db);
    println!(
        "  Compressor:  {:.1} dB threshold, {:.2}:1",
        chain.compressor_threshold_db, chain.compressor_ratio
    );
    if let (Some(threshold), Some(depth)) = (chain.de_esser_threshold_db, chain.de_esser_depth_db) {
        println!("  De-esser:    {threshold:.1} dB threshold, {depth:.1} dB depth");
    }
    if chain.reference_match_bands > 0 {
        println!("  Match bands: {}", chain.reference_match_bands);
    }
    println!("  Limiter:     {:.1} dB ceiling", d.limiter_ceiling_db);
}

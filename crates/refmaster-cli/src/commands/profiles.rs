//! Mastering profile commands.
//!
//! Lists the factory profiles, their aliases and any user or system profile
//! files; prints or exports a profile as TOML.

use super::common::load_profile;
use anyhow::Context;
use clap::Args;
use refmaster_config::{
    EqPreset, MasteringProfile, PROFILE_ALIASES, factory_profiles, list_system_profiles,
    list_user_profiles, profile_name_from_path, user_profiles_dir,
};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ProfilesArgs {
    /// Print a profile as TOML
    #[arg(long, value_name = "NAME", conflicts_with = "export")]
    show: Option<String>,

    /// Export a profile to a TOML file (requires --output)
    #[arg(long, value_name = "NAME", requires = "output")]
    export: Option<String>,

    /// Destination for --export
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

pub fn run(args: ProfilesArgs) -> anyhow::Result<()> {
    if let Some(name) = &args.show {
        let profile = load_profile(name)?;
        print!("{}", profile.to_toml()?);
        return Ok(());
    }
    if let (Some(name), Some(output)) = (&args.export, &args.output) {
        return export_profile(name, output);
    }
    list_profiles();
    Ok(())
}

fn export_profile(name: &str, output: &Path) -> anyhow::Result<()> {
    let profile = load_profile(name)?;
    profile
        .save(output)
        .with_context(|| format!("failed to export '{}' to {}", profile.name, output.display()))?;
    println!("Exported '{}' to {}", profile.name, output.display());
    Ok(())
}

fn list_profiles() {
    println!("Factory Profiles:");
    println!("=================");
    for profile in factory_profiles() {
        let desc = profile.description.as_deref().unwrap_or("");
        println!("  {:20} - {}", profile.name, desc);
        print_tuning_line(&profile);
    }
    println!();

    println!("Aliases:");
    println!("========");
    for (alias, canonical) in PROFILE_ALIASES {
        println!("  {alias:34} -> {canonical}");
    }
    println!();

    println!("EQ Preset Defaults:");
    println!("===================");
    for preset in EqPreset::ALL {
        println!("  {:20} -> {}", preset.as_str(), preset.default_profile());
    }
    println!();

    println!("User Profiles ({}):", user_profiles_dir().display());
    println!("==============");
    print_profile_files(&list_user_profiles());

    let system = list_system_profiles();
    if !system.is_empty() {
        println!("System Profiles:");
        println!("================");
        print_profile_files(&system);
    }
}

fn print_tuning_line(profile: &MasteringProfile) {
    println!(
        "  {:20}   tolerance {:.2} LU, {} iteration(s), true peak {:.1} dBTP",
        "",
        profile.loudness.tolerance_lu,
        profile.loudness.max_iterations,
        profile.true_peak.target_dbtp
    );
}

fn print_profile_files(paths: &[PathBuf]) {
    if paths.is_empty() {
        println!("  (none)");
        println!();
        return;
    }
    for path in paths {
        let name = profile_name_from_path(path).unwrap_or_else(|| "unknown".to_string());
        match MasteringProfile::load(path) {
            Ok(profile) => {
                let desc = profile.description.as_deref().unwrap_or("");
                println!("  {:20} - {}", name, desc);
            }
            Err(_) => println!("  {:20} - (error loading)", name),
        }
    }
    println!();
}

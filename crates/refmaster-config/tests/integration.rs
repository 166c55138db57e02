//! Integration tests for refmaster-config.

use refmaster_config::{
    ConfigError, EqPreset, MasteringProfile, factory_profiles, get_factory_profile, load_profile,
};
use tempfile::TempDir;

#[test]
fn test_save_and_load_custom_profile() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("club.toml");

    let profile = MasteringProfile::default()
        .with_name("club")
        .with_description("Loud and bright")
        .with_true_peak_target(-0.5, 0.1)
        .with_max_iterations(5);
    profile.save(&path).expect("save creates parent directories");

    let loaded = MasteringProfile::load(&path).unwrap();
    assert_eq!(loaded, profile);

    let via_lookup = load_profile(path.to_str().unwrap()).unwrap();
    assert_eq!(via_lookup.name, "club");
}

#[test]
fn test_factory_name_wins_over_files() {
    let profile = load_profile("Conservative").unwrap();
    assert_eq!(profile.name, "conservative");
    assert_eq!(profile.loudness.max_iterations, 2);
}

#[test]
fn test_exported_factory_profile_reloads() {
    let temp_dir = TempDir::new().unwrap();
    for profile in factory_profiles() {
        let path = temp_dir.path().join(format!("{}.toml", profile.name));
        profile.save(&path).unwrap();
        assert_eq!(MasteringProfile::load(&path).unwrap(), profile);
    }
}

#[test]
fn test_invalid_file_reports_validation_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(
        &path,
        "name = \"bad\"\n[true_peak]\noversample_factor = 64\n",
    )
    .unwrap();

    let err = load_profile(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got {err}");
    assert!(err.to_string().contains("true_peak.oversample_factor"));
}

#[test]
fn test_missing_file_is_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = MasteringProfile::load(temp_dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_every_preset_default_profile_exists() {
    for preset in EqPreset::ALL {
        let profile = get_factory_profile(preset.default_profile());
        assert!(profile.is_some(), "{preset} maps to a missing profile");
    }
}

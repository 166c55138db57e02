//! Factory mastering profiles bundled with refmaster.
//!
//! Three tuning tables ship with the library: `default`, `conservative` and
//! `aggressive`. Several legacy names resolve to them through
//! [`PROFILE_ALIASES`].

use crate::MasteringProfile;
use crate::error::ConfigError;
use crate::paths::find_profile;

/// Canonical factory profile names.
pub static FACTORY_PROFILE_NAMES: &[&str] = &["default", "conservative", "aggressive"];

/// Alternate names and the factory profile each resolves to.
pub static PROFILE_ALIASES: &[(&str, &str)] = &[
    ("reference-mastering-default", "default"),
    ("reference-mastering-conservative", "conservative"),
    ("reference-mastering-aggressive", "aggressive"),
    ("streaming-balanced", "default"),
    ("streaming-loud", "aggressive"),
];

static FACTORY_PROFILES_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PROFILE),
    ("conservative", CONSERVATIVE_PROFILE),
    ("aggressive", AGGRESSIVE_PROFILE),
];

/// Balanced correction for most material.
const DEFAULT_PROFILE: &str = r#"
name = "default"
description = "Balanced reference matching"

[analysis]
band_edges_hz = [20.0, 60.0, 120.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0]
eq_max_abs_db = 4.0
eq_min_correction_db = 0.75
normalized_rms_db = -24.0
smoothing_kernel = [0.25, 0.5, 0.25]

[decision]
gain_max_db = 8.0
shelf_scale_db = 12.0
shelf_max_db = 3.0
threshold_base_db = -22.0
threshold_crest_slope = 1.2
threshold_min_db = -30.0
threshold_max_db = -14.0
ratio_base = 2.2
ratio_crest_slope = 0.3
ratio_min = 1.5
ratio_ceiling = 4.0
limiter_ceiling_db = -0.9
clipping_ceiling_db = -1.0

[decision.de_esser]
min_trigger = 0.01
depth_scale_db = 60.0
depth_min_db = 1.0
depth_max_db = 6.0
threshold_base_db = -28.0
threshold_slope_db = 40.0
threshold_min_db = -40.0
threshold_max_db = -20.0

[loudness]
tolerance_lu = 0.3
max_correction_db = 1.5
delta_max_db = 12.0
max_iterations = 3

[true_peak]
target_dbtp = -1.0
tolerance_db = 0.1
oversample_factor = 4
"#;

/// Gentler EQ, wider loudness window, more true-peak headroom.
const CONSERVATIVE_PROFILE: &str = r#"
name = "conservative"
description = "Gentle correction with extra true-peak headroom"

[analysis]
eq_max_abs_db = 3.0
eq_min_correction_db = 1.0
normalized_rms_db = -24.0
smoothing_kernel = [0.2, 0.6, 0.2]

[loudness]
tolerance_lu = 0.45
max_correction_db = 1.0
delta_max_db = 12.0
max_iterations = 2

[true_peak]
target_dbtp = -1.2
tolerance_db = 0.08
oversample_factor = 4
"#;

/// Stronger EQ moves, tighter loudness window, hotter true-peak target.
const AGGRESSIVE_PROFILE: &str = r#"
name = "aggressive"
description = "Strong correction for loud streaming masters"

[analysis]
eq_max_abs_db = 5.5
eq_min_correction_db = 0.5
normalized_rms_db = -23.0
smoothing_kernel = [0.3, 0.4, 0.3]

[loudness]
tolerance_lu = 0.2
max_correction_db = 2.0
delta_max_db = 12.0
max_iterations = 4

[true_peak]
target_dbtp = -0.8
tolerance_db = 0.12
oversample_factor = 4
"#;

/// Get all factory profiles.
pub fn factory_profiles() -> Vec<MasteringProfile> {
    FACTORY_PROFILES_TOML
        .iter()
        .filter_map(|(_, toml)| MasteringProfile::from_toml(toml).ok())
        .collect()
}

/// Map a factory name or alias to its canonical factory name.
///
/// Matching ignores case and surrounding whitespace. Returns `None` for
/// names that are neither.
///
/// ```rust
/// use refmaster_config::resolve_profile_name;
///
/// assert_eq!(resolve_profile_name("Streaming-Loud"), Some("aggressive"));
/// assert_eq!(resolve_profile_name("default"), Some("default"));
/// assert_eq!(resolve_profile_name("club"), None);
/// ```
pub fn resolve_profile_name(name: &str) -> Option<&'static str> {
    let key = name.trim().to_lowercase();
    if let Some(canonical) = FACTORY_PROFILE_NAMES.iter().copied().find(|n| *n == key) {
        return Some(canonical);
    }
    PROFILE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}

/// Get a factory profile by name or alias.
pub fn get_factory_profile(name: &str) -> Option<MasteringProfile> {
    let canonical = resolve_profile_name(name)?;
    FACTORY_PROFILES_TOML
        .iter()
        .find(|(n, _)| *n == canonical)
        .and_then(|(_, toml)| MasteringProfile::from_toml(toml).ok())
}

/// Check whether a name is a factory profile or alias.
pub fn is_factory_profile(name: &str) -> bool {
    resolve_profile_name(name).is_some()
}

/// Get the canonical factory profile names.
pub fn factory_profile_names() -> Vec<&'static str> {
    FACTORY_PROFILES_TOML.iter().map(|(name, _)| *name).collect()
}

/// Load a profile by factory name, alias, file path or user/system profile
/// name, in that order.
///
/// # Errors
///
/// [`ConfigError::ProfileNotFound`] when nothing matches; read, parse and
/// validation errors from a matching file.
pub fn load_profile(name_or_path: &str) -> Result<MasteringProfile, ConfigError> {
    if let Some(profile) = get_factory_profile(name_or_path) {
        return Ok(profile);
    }
    match find_profile(name_or_path) {
        Some(path) => MasteringProfile::load(path),
        None => Err(ConfigError::ProfileNotFound(name_or_path.to_string())),
    }
}

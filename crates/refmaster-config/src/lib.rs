//! Mastering profiles and options for refmaster.
//!
//! A [`MasteringProfile`] is an immutable bundle of tuning tables: analysis
//! band layout and correction limits, decision clamp ranges, loudness
//! convergence tolerances and the true-peak target. Profiles are plain
//! values; the engine receives one explicitly for every run.
//!
//! # Features
//!
//! - **Profiles**: Load and save profiles as TOML, build them programmatically
//! - **Factory Profiles**: `default`, `conservative`, `aggressive` plus aliases
//! - **Options**: EQ mode, EQ preset and de-esser mode with case-insensitive parsing
//! - **Validation**: Range and ordering checks for every tuning value
//! - **Paths**: Platform-specific profile directories
//!
//! # Example
//!
//! ```rust,no_run
//! use refmaster_config::{MasteringProfile, get_factory_profile, user_profiles_dir};
//!
//! let profile = get_factory_profile("streaming-loud").unwrap();
//! assert_eq!(profile.name, "aggressive");
//!
//! let custom = MasteringProfile::default()
//!     .with_name("club")
//!     .with_true_peak_target(-0.5, 0.1);
//! custom.validate().unwrap();
//! custom.save(user_profiles_dir().join("club.toml")).unwrap();
//! ```

mod error;
mod profile;

/// Factory profiles bundled with the library.
pub mod factory_profiles;

/// EQ mode, EQ preset and de-esser mode.
pub mod options;

/// Platform-specific paths for profiles.
pub mod paths;

/// Profile validation.
pub mod validation;

pub use error::ConfigError;
pub use factory_profiles::{
    FACTORY_PROFILE_NAMES, PROFILE_ALIASES, factory_profile_names, factory_profiles,
    get_factory_profile, is_factory_profile, load_profile, resolve_profile_name,
};
pub use options::{DeEsserMode, EqMode, EqPreset, MasteringOptions};
pub use paths::{
    ensure_user_profiles_dir, find_profile, list_all_profiles, list_system_profiles,
    list_user_profiles, profile_name_from_path, system_profiles_dir, user_config_dir,
    user_profiles_dir,
};
pub use profile::{
    AnalysisTuning, DeEsserTuning, DecisionTuning, LoudnessTuning, MasteringProfile,
    TruePeakTuning,
};
pub use validation::{ValidationError, ValidationResult, validate_profile};

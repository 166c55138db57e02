//! User-facing mastering options.
//!
//! Each option is a closed enum with a canonical kebab-case spelling.
//! Parsing trims the input and ignores case; a rejected value produces
//! [`ConfigError::InvalidOption`] listing every allowed spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

fn parse_option<T: Copy>(
    kind: &'static str,
    value: &str,
    all: &[T],
    name: impl Fn(T) -> &'static str,
) -> Result<T, ConfigError> {
    let key = value.trim().to_lowercase();
    all.iter()
        .copied()
        .find(|v| name(*v) == key)
        .ok_or_else(|| ConfigError::InvalidOption {
            kind,
            value: value.to_string(),
            allowed: all.iter().map(|v| name(*v)).collect::<Vec<_>>().join(", "),
        })
}

/// How the EQ stage is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EqMode {
    /// Broad shelves only.
    #[default]
    Fixed,
    /// Broad shelves plus the per-band reference-match bank.
    ReferenceMatch,
}

impl EqMode {
    /// All modes in declaration order.
    pub const ALL: [EqMode; 2] = [EqMode::Fixed, EqMode::ReferenceMatch];

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            EqMode::Fixed => "fixed",
            EqMode::ReferenceMatch => "reference-match",
        }
    }
}

/// Tonal flavour layered on top of the reference correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EqPreset {
    /// No offsets.
    #[default]
    Neutral,
    /// More low end, softer top.
    Warm,
    /// More air, leaner lows.
    Bright,
    /// Forward mids and presence.
    VocalPresence,
    /// Heavier low end.
    BassBoost,
}

impl EqPreset {
    /// All presets in declaration order.
    pub const ALL: [EqPreset; 5] = [
        EqPreset::Neutral,
        EqPreset::Warm,
        EqPreset::Bright,
        EqPreset::VocalPresence,
        EqPreset::BassBoost,
    ];

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            EqPreset::Neutral => "neutral",
            EqPreset::Warm => "warm",
            EqPreset::Bright => "bright",
            EqPreset::VocalPresence => "vocal-presence",
            EqPreset::BassBoost => "bass-boost",
        }
    }

    /// Offset added to the 125 Hz low shelf (dB).
    pub fn low_shelf_offset_db(self) -> f32 {
        match self {
            EqPreset::Neutral => 0.0,
            EqPreset::Warm => 1.5,
            EqPreset::Bright => -0.8,
            EqPreset::VocalPresence => -0.6,
            EqPreset::BassBoost => 2.0,
        }
    }

    /// Offset added to the 6 kHz high shelf (dB).
    pub fn high_shelf_offset_db(self) -> f32 {
        match self {
            EqPreset::Neutral => 0.0,
            EqPreset::Warm => -0.8,
            EqPreset::Bright => 1.8,
            EqPreset::VocalPresence => 1.2,
            EqPreset::BassBoost => -0.5,
        }
    }

    /// Bias added to reference-match bands as `(low, mid, high)` in dB.
    pub fn band_biases_db(self) -> (f32, f32, f32) {
        match self {
            EqPreset::Neutral => (0.0, 0.0, 0.0),
            EqPreset::Warm => (0.5, 0.0, 0.0),
            EqPreset::Bright => (0.0, 0.0, 0.4),
            EqPreset::VocalPresence => (0.0, 0.8, 0.2),
            EqPreset::BassBoost => (0.8, 0.0, 0.0),
        }
    }

    /// Bias for a reference-match band centred at `center_hz`.
    ///
    /// Bands at or below 250 Hz take the low bias, bands at or above 4 kHz
    /// the high bias, everything between the mid bias.
    pub fn band_bias_db(self, center_hz: f32) -> f32 {
        let (low, mid, high) = self.band_biases_db();
        if center_hz <= 250.0 {
            low
        } else if center_hz >= 4000.0 {
            high
        } else {
            mid
        }
    }

    /// Factory profile that suits this preset when none is given.
    pub fn default_profile(self) -> &'static str {
        match self {
            EqPreset::Neutral | EqPreset::VocalPresence => "default",
            EqPreset::Warm => "conservative",
            EqPreset::Bright | EqPreset::BassBoost => "aggressive",
        }
    }
}

/// Whether the de-esser stage may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeEsserMode {
    /// Never insert the de-esser.
    #[default]
    Off,
    /// Insert it when the decision carries de-esser settings.
    Auto,
}

impl DeEsserMode {
    /// All modes in declaration order.
    pub const ALL: [DeEsserMode; 2] = [DeEsserMode::Off, DeEsserMode::Auto];

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            DeEsserMode::Off => "off",
            DeEsserMode::Auto => "auto",
        }
    }
}

macro_rules! option_traits {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_option(stringify!($ty), s, &$ty::ALL, $ty::as_str)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

option_traits!(EqMode);
option_traits!(EqPreset);
option_traits!(DeEsserMode);

/// Option set for one mastering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteringOptions {
    /// EQ drive mode.
    pub eq_mode: EqMode,
    /// Tonal preset.
    pub eq_preset: EqPreset,
    /// De-esser mode.
    pub de_esser_mode: DeEsserMode,
}

impl MasteringOptions {
    /// Set the EQ mode.
    pub fn with_eq_mode(mut self, eq_mode: EqMode) -> Self {
        self.eq_mode = eq_mode;
        self
    }

    /// Set the EQ preset.
    pub fn with_eq_preset(mut self, eq_preset: EqPreset) -> Self {
        self.eq_preset = eq_preset;
        self
    }

    /// Set the de-esser mode.
    pub fn with_de_esser_mode(mut self, de_esser_mode: DeEsserMode) -> Self {
        self.de_esser_mode = de_esser_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MasteringOptions::default();
        assert_eq!(options.eq_mode, EqMode::Fixed);
        assert_eq!(options.eq_preset, EqPreset::Neutral);
        assert_eq!(options.de_esser_mode, DeEsserMode::Off);
    }

    #[test]
    fn test_parse_ignores_case_and_whitespace() {
        assert_eq!(" Reference-Match ".parse::<EqMode>().unwrap(), EqMode::ReferenceMatch);
        assert_eq!("VOCAL-PRESENCE".parse::<EqPreset>().unwrap(), EqPreset::VocalPresence);
        assert_eq!("Auto".parse::<DeEsserMode>().unwrap(), DeEsserMode::Auto);
    }

    #[test]
    fn test_parse_error_lists_allowed_values() {
        let err = "loud".parse::<EqPreset>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid EqPreset: 'loud'. Allowed values: neutral, warm, bright, vocal-presence, bass-boost"
        );
        let err = "on".parse::<DeEsserMode>().unwrap_err();
        assert!(err.to_string().ends_with("Allowed values: off, auto"));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for preset in EqPreset::ALL {
            assert_eq!(preset.to_string().parse::<EqPreset>().unwrap(), preset);
        }
        for mode in EqMode::ALL {
            assert_eq!(mode.to_string().parse::<EqMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_preset_tables() {
        assert_eq!(EqPreset::Warm.low_shelf_offset_db(), 1.5);
        assert_eq!(EqPreset::Bright.high_shelf_offset_db(), 1.8);
        assert_eq!(EqPreset::VocalPresence.band_bias_db(1000.0), 0.8);
        assert_eq!(EqPreset::VocalPresence.band_bias_db(8000.0), 0.2);
        assert_eq!(EqPreset::BassBoost.band_bias_db(250.0), 0.8);
        assert_eq!(EqPreset::Neutral.band_bias_db(60.0), 0.0);
    }

    #[test]
    fn test_preset_default_profiles() {
        assert_eq!(EqPreset::Neutral.default_profile(), "default");
        assert_eq!(EqPreset::Warm.default_profile(), "conservative");
        assert_eq!(EqPreset::Bright.default_profile(), "aggressive");
        assert_eq!(EqPreset::VocalPresence.default_profile(), "default");
        assert_eq!(EqPreset::BassBoost.default_profile(), "aggressive");
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let options = MasteringOptions::default()
            .with_eq_mode(EqMode::ReferenceMatch)
            .with_eq_preset(EqPreset::BassBoost);
        let toml = toml::to_string(&options).unwrap();
        assert!(toml.contains("eq_mode = \"reference-match\""), "{toml}");
        assert!(toml.contains("eq_preset = \"bass-boost\""), "{toml}");
        let parsed: MasteringOptions = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, options);
    }
}

#![forbid(unsafe_code)]

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// When the recorder turns an automatic reading into a history entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RecordFrequency {
    /// New day, or cycle count / nominal capacity changed.
    #[default]
    Automatic,
    /// Cycle count or nominal capacity changed.
    DataChanged,
    /// First reading of each calendar day.
    EveryDay,
    /// Only explicit captures.
    Manual,
}

impl RecordFrequency {
    pub const ALL: [RecordFrequency; 4] = [
        Self::Automatic,
        Self::DataChanged,
        Self::EveryDay,
        Self::Manual,
    ];

    /// Unknown ordinals (including `0`) map to [`RecordFrequency::Automatic`].
    pub fn from_ordinal(value: u64) -> Self {
        match value {
            2 => Self::DataChanged,
            3 => Self::EveryDay,
            4 => Self::Manual,
            _ => Self::Automatic,
        }
    }

    pub fn ordinal(self) -> i64 {
        match self {
            Self::Automatic => 1,
            Self::DataChanged => 2,
            Self::EveryDay => 3,
            Self::Manual => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::DataChanged => "data-changed",
            Self::EveryDay => "every-day",
            Self::Manual => "manual",
        }
    }
}

impl FromStr for RecordFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == needle)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "record frequency",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for RecordFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Recording switch and frequency.
///
/// Persisted as a single integer: the magnitude is the frequency ordinal and
/// a negative sign means recording is disabled. Disabling therefore keeps the
/// mode that resumes on re-enable. A stored `0` reads as enabled
/// [`RecordFrequency::Automatic`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "i64", into = "i64")]
pub struct RecordingConfig {
    pub enabled: bool,
    pub mode: RecordFrequency,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self::new(RecordFrequency::default())
    }
}

impl RecordingConfig {
    /// An enabled configuration using `mode`.
    pub fn new(mode: RecordFrequency) -> Self {
        Self {
            enabled: true,
            mode,
        }
    }

    pub fn from_raw(value: i64) -> Self {
        Self {
            enabled: value >= 0,
            mode: RecordFrequency::from_ordinal(value.unsigned_abs()),
        }
    }

    pub fn to_raw(self) -> i64 {
        let ordinal = self.mode.ordinal();
        if self.enabled { ordinal } else { -ordinal }
    }

    /// Change the frequency without touching the switch.
    pub fn with_mode(self, mode: RecordFrequency) -> Self {
        Self { mode, ..self }
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    pub fn toggled(self) -> Self {
        self.with_enabled(!self.enabled)
    }
}

impl From<i64> for RecordingConfig {
    fn from(value: i64) -> Self {
        Self::from_raw(value)
    }
}

impl From<RecordingConfig> for i64 {
    fn from(config: RecordingConfig) -> Self {
        config.to_raw()
    }
}

/// The `[recording]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Recording {
    /// Switch and frequency, stored sign-encoded.
    pub record_frequency: RecordingConfig,

    /// Show the history list on the home screen.
    pub show_history_in_home: bool,

    /// Include design capacity when listing records.
    pub show_design_capacity: bool,
}

impl Default for Recording {
    fn default() -> Self {
        Self {
            record_frequency: RecordingConfig::default(),
            show_history_in_home: true,
            show_design_capacity: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn disabling_every_day_stores_negative_three() {
        let config = RecordingConfig::new(RecordFrequency::EveryDay);
        assert_eq!(config.to_raw(), 3);

        let disabled = config.toggled();
        assert_eq!(disabled.to_raw(), -3);

        let restored = RecordingConfig::from_raw(-3).toggled();
        assert!(restored.enabled);
        assert_eq!(restored.mode, RecordFrequency::EveryDay);
        assert_eq!(restored.to_raw(), 3);
    }

    #[test]
    fn zero_reads_as_enabled_automatic() {
        let config = RecordingConfig::from_raw(0);
        assert!(config.enabled);
        assert_eq!(config.mode, RecordFrequency::Automatic);
        assert_eq!(config.to_raw(), 1);
    }

    #[test]
    fn changing_mode_while_disabled_stays_disabled() {
        let config = RecordingConfig::from_raw(-1).with_mode(RecordFrequency::Manual);
        assert_eq!(config.to_raw(), -4);
    }

    #[test]
    fn unknown_magnitude_keeps_sign() {
        let config = RecordingConfig::from_raw(-42);
        assert!(!config.enabled);
        assert_eq!(config.mode, RecordFrequency::Automatic);
        assert!(RecordingConfig::from_raw(i64::MIN).mode == RecordFrequency::Automatic);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!(
            "data_changed".parse::<RecordFrequency>().unwrap(),
            RecordFrequency::DataChanged
        );
        assert_eq!(
            "Every-Day".parse::<RecordFrequency>().unwrap(),
            RecordFrequency::EveryDay
        );
        assert!("hourly".parse::<RecordFrequency>().is_err());
    }

    proptest! {
        #[test]
        fn raw_roundtrip_for_valid_values(ordinal in 1i64..=4, enabled: bool) {
            let raw = if enabled { ordinal } else { -ordinal };
            prop_assert_eq!(RecordingConfig::from_raw(raw).to_raw(), raw);
        }

        #[test]
        fn double_toggle_is_identity(raw in -4i64..=4) {
            let config = RecordingConfig::from_raw(raw);
            prop_assert_eq!(config.toggled().toggled(), config);
            prop_assert_eq!(config.toggled().mode, config.mode);
        }
    }
}

#![forbid(unsafe_code)]

use crate::{Config, Error, RecordFrequency, RecordingConfig, RoundingPolicy};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Typed access to the settings file.
///
/// Every setter persists the whole configuration right away.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    config: Config,
    existed: bool,
}

impl SettingsStore {
    /// Open the settings file at `path`, creating it with defaults if missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        if path.exists() {
            let config = Config::load(&path)?;
            return Ok(Self {
                path: Some(path),
                config,
                existed: true,
            });
        }

        info!(path = %path.display(), "creating settings file with defaults");
        let store = Self {
            path: Some(path),
            config: Config::new(),
            existed: false,
        };
        store.apply()?;
        Ok(store)
    }

    /// Settings that are never written anywhere.
    pub fn in_memory(config: Config) -> Self {
        Self {
            path: None,
            config,
            existed: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the file was already present when opened.
    pub fn existed(&self) -> bool {
        self.existed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Re-read the file, discarding in-memory state.
    pub fn reload(&mut self) -> Result<(), Error> {
        if let Some(path) = &self.path {
            self.config = Config::load(path)?;
            debug!(config = ?self.config, "reloaded settings");
        }
        Ok(())
    }

    fn apply(&self) -> Result<(), Error> {
        match &self.path {
            Some(path) => self.config.save(path),
            None => Ok(()),
        }
    }

    fn update(&mut self, change: impl FnOnce(&mut Config)) -> Result<(), Error> {
        change(&mut self.config);
        self.apply()
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.config.display.rounding
    }

    pub fn set_rounding(&mut self, policy: RoundingPolicy) -> Result<(), Error> {
        self.update(|c| c.display.rounding = policy)
    }

    pub fn recording(&self) -> RecordingConfig {
        self.config.recording.record_frequency
    }

    pub fn recording_enabled(&self) -> bool {
        self.recording().enabled
    }

    /// Select a frequency. A disabled recorder stays disabled.
    pub fn set_record_frequency(&mut self, mode: RecordFrequency) -> Result<(), Error> {
        self.update(|c| {
            c.recording.record_frequency = c.recording.record_frequency.with_mode(mode);
        })
    }

    pub fn set_recording_enabled(&mut self, enabled: bool) -> Result<(), Error> {
        self.update(|c| {
            c.recording.record_frequency = c.recording.record_frequency.with_enabled(enabled);
        })
    }

    /// Flip the recording switch, keeping the selected frequency.
    pub fn toggle_recording(&mut self) -> Result<RecordingConfig, Error> {
        self.update(|c| c.recording.record_frequency = c.recording.record_frequency.toggled())?;
        Ok(self.recording())
    }

    pub fn auto_refresh(&self) -> bool {
        self.config.display.auto_refresh
    }

    pub fn set_auto_refresh(&mut self, value: bool) -> Result<(), Error> {
        self.update(|c| c.display.auto_refresh = value)
    }

    pub fn force_show_charging_data(&self) -> bool {
        self.config.display.force_show_charging_data
    }

    pub fn set_force_show_charging_data(&mut self, value: bool) -> Result<(), Error> {
        self.update(|c| c.display.force_show_charging_data = value)
    }

    pub fn show_settings_battery_info(&self) -> bool {
        self.config.display.show_settings_battery_info
    }

    pub fn set_show_settings_battery_info(&mut self, value: bool) -> Result<(), Error> {
        self.update(|c| c.display.show_settings_battery_info = value)
    }

    pub fn show_history_in_home(&self) -> bool {
        self.config.recording.show_history_in_home
    }

    pub fn set_show_history_in_home(&mut self, value: bool) -> Result<(), Error> {
        self.update(|c| c.recording.show_history_in_home = value)
    }

    pub fn show_design_capacity(&self) -> bool {
        self.config.recording.show_design_capacity
    }

    pub fn set_show_design_capacity(&mut self, value: bool) -> Result<(), Error> {
        self.update(|c| c.recording.show_design_capacity = value)
    }
}

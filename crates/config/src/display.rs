#![forbid(unsafe_code)]

use crate::rounding::RoundingPolicy;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Display {
    /// Periodically re-read telemetry while watching.
    pub auto_refresh: bool,

    /// Show charger data even when the battery is not charging.
    pub force_show_charging_data: bool,

    /// Show the health figures reported by the system settings.
    pub show_settings_battery_info: bool,

    /// Rounding applied to the health percentage.
    pub rounding: RoundingPolicy,

    /// Refresh period in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub refresh_interval: Duration,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            force_show_charging_data: false,
            show_settings_battery_info: false,
            rounding: RoundingPolicy::default(),
            refresh_interval: Duration::from_secs(5),
        }
    }
}

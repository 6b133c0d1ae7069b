use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use config::{RecordFrequency, RoundingPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Battery health and history for laptops.
///
/// Reads the battery registry dump written by the privileged helper,
/// shows the decoded telemetry and health, and keeps a history of readings.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// Created with defaults if it does not exist. Without it, settings
    /// changes only last for this run.
    #[arg(short, long)]
    pub conffile: Option<PathBuf>,

    /// History database. Overrides `persistence.database_path`.
    ///
    /// Without either, history is kept in memory.
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// JSON dump of the battery registry.
    #[arg(short, long, value_parser = validate_file)]
    pub raw: Option<PathBuf>,

    /// JSON dump of the battery health settings.
    #[arg(long, value_parser = validate_file)]
    pub settings_health: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Show the current battery reading.
    Show {
        /// Print the decoded snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run one recording cycle against the current reading.
    Record {
        /// Capture the reading regardless of the recording settings.
        #[arg(long)]
        manual: bool,
    },

    /// Add a record by hand.
    Add {
        /// Cycle count at the time of the reading.
        #[arg(long)]
        cycle_count: i64,

        /// Health percentage, e.g. `87` or `87.5`.
        #[arg(long, value_parser = validate_percent)]
        health: String,

        /// When the reading was taken, as epoch seconds. Defaults to now.
        #[arg(long)]
        date: Option<i64>,
    },

    /// List recorded history, newest first.
    History {
        #[arg(long)]
        json: bool,
    },

    /// Delete one history record.
    Delete { id: i64 },

    /// Delete every history record.
    Clear {
        /// Required to actually clear.
        #[arg(long)]
        yes: bool,
    },

    /// Export history as CSV.
    Export {
        /// Target directory. Overrides `persistence.export_dir`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Show or change settings.
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Keep showing the battery reading and record in the background.
    ///
    /// SIGUSR1 captures a manual record, SIGUSR2 reloads the configuration.
    Watch {
        /// Refresh period in seconds. Overrides `display.refresh_interval`.
        #[arg(long, value_parser = validate_interval)]
        interval: Option<Duration>,
    },
}

#[derive(Debug, Subcommand, Clone)]
pub enum SettingsAction {
    Show,

    /// keep, ceiling, round or floor.
    Rounding {
        #[arg(value_parser = parse_rounding)]
        policy: RoundingPolicy,
    },

    /// automatic, data-changed, every-day or manual.
    Frequency {
        #[arg(value_parser = parse_frequency)]
        mode: RecordFrequency,
    },

    /// Switch automatic recording on or off.
    ToggleRecording,

    /// Set a display or history option.
    Set {
        #[arg(value_enum)]
        option: Toggle,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    AutoRefresh,
    ForceShowChargingData,
    ShowSettingsBatteryInfo,
    ShowHistoryInHome,
    ShowDesignCapacity,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Validate a refresh period in whole seconds.
#[inline(always)]
fn validate_interval(secs: &str) -> Result<Duration, String> {
    let secs: u64 = secs
        .parse()
        .map_err(|_| format!("`{secs}` is not a whole number of seconds"))?;
    if (1..=3600).contains(&secs) {
        Ok(Duration::from_secs(secs))
    } else {
        Err("Interval must be between 1 and 3600 seconds".to_string())
    }
}

/// Validate a health percentage.
fn validate_percent(value: &str) -> Result<String, String> {
    let value = value.trim().trim_end_matches('%');
    let number: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a percentage"))?;
    if (0.0..=100.0).contains(&number) {
        Ok(value.to_owned())
    } else {
        Err("Health must be between 0 and 100".to_string())
    }
}

fn parse_rounding(value: &str) -> Result<RoundingPolicy, String> {
    value.parse().map_err(|err: config::Error| err.to_string())
}

fn parse_frequency(value: &str) -> Result<RecordFrequency, String> {
    value.parse().map_err(|err: config::Error| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_settings_actions() {
        let cli = Cli::try_parse_from(["battery-info", "settings", "frequency", "every_day"]).unwrap();
        match cli.command {
            Command::Settings {
                action: Some(SettingsAction::Frequency { mode }),
            } => assert_eq!(mode, RecordFrequency::EveryDay),
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "battery-info",
            "settings",
            "set",
            "show-design-capacity",
            "false",
        ])
        .unwrap();
        match cli.command {
            Command::Settings {
                action: Some(SettingsAction::Set { option, value }),
            } => {
                assert_eq!(option, Toggle::ShowDesignCapacity);
                assert!(!value);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["battery-info", "settings", "rounding", "up"]).is_err());
    }

    #[test]
    fn percent_accepts_suffix() {
        assert_eq!(validate_percent("87.5%").as_deref(), Ok("87.5"));
        assert!(validate_percent("101").is_err());
        assert!(validate_percent("many").is_err());
    }

    proptest! {
        #[test]
        fn interval_bounds(secs in 0u64..10_000) {
            let parsed = validate_interval(&secs.to_string());
            prop_assert_eq!(parsed.is_ok(), (1..=3600).contains(&secs));
        }
    }
}

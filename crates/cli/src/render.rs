//! Plain-text views of readings, history and settings.

use chrono::TimeZone;
use config::Config;
use history::{HistoryRecord, RecordOutcome};
use std::fmt::{self, Display};
use telemetry::{SettingsHealth, TelemetrySnapshot};

const UNKNOWN: &str = "Unknown";
const MISSING: &str = "-";

struct Opt<'a, T>(&'a Option<T>, &'a str);

impl<T: Display> Display for Opt<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}{}", self.1),
            None => f.write_str(MISSING),
        }
    }
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => MISSING,
    }
}

fn row(f: &mut fmt::Formatter<'_>, label: &str, value: impl Display) -> fmt::Result {
    writeln!(f, "{:<22}{value}", format!("{label}:"))
}

/// The home screen: one decoded reading plus whatever the settings ask for.
pub struct SnapshotView<'a> {
    pub snapshot: &'a TelemetrySnapshot,
    pub config: &'a Config,
    pub settings_health: Option<&'a SettingsHealth>,
    pub latest: Option<&'a HistoryRecord>,
}

impl Display for SnapshotView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.snapshot;
        row(f, "Health", Opt(&s.maximum_capacity, "%"))?;
        row(f, "Cycle count", Opt(&s.cycle_count, ""))?;
        row(f, "Manufacturer", s.manufacturer().unwrap_or(UNKNOWN))?;
        row(f, "Serial", Opt(&s.masked_serial(), ""))?;
        if self.config.recording.show_design_capacity {
            row(f, "Design capacity", Opt(&s.design_capacity, " mAh"))?;
        }
        row(f, "Full charge capacity", Opt(&s.nominal_charge_capacity, " mAh"))?;
        row(f, "Remaining charge", Opt(&s.raw_current_capacity, " mAh"))?;
        row(f, "Charge", Opt(&s.current_capacity, "%"))?;
        row(f, "Voltage", Opt(&s.voltage, " mV"))?;
        row(f, "Amperage", Opt(&s.instant_amperage, " mA"))?;
        row(f, "Temperature", Opt(&s.temperature_celsius(), " °C"))?;
        row(f, "Charging", yes_no(s.is_charging))?;
        row(f, "Fully charged", yes_no(s.fully_charged))?;
        row(f, "External power", yes_no(s.external_connected))?;

        if s.shows_charger_data(self.config.display.force_show_charging_data) {
            if let Some(adapter) = &s.adapter_details {
                writeln!(f)?;
                row(f, "Adapter", Opt(&adapter.description, ""))?;
                row(f, "Adapter power", Opt(&adapter.watts, " W"))?;
                row(f, "Adapter voltage", Opt(&adapter.adapter_voltage, " mV"))?;
                for option in &adapter.usb_hvc_menu {
                    row(
                        f,
                        &format!("USB HVC #{}", option.index),
                        format_args!("{} mV / {} mA", option.max_voltage, option.max_current),
                    )?;
                }
            }
            if let Some(charger) = &s.charger_data {
                row(f, "Charging current", Opt(&charger.charging_current, " mA"))?;
                row(f, "Charging voltage", Opt(&charger.charging_voltage, " mV"))?;
                row(f, "Not charging reason", Opt(&charger.not_charging_reason, ""))?;
            }
        }

        if self.config.display.show_settings_battery_info {
            if let Some(health) = self.settings_health {
                writeln!(f)?;
                row(f, "Settings health", Opt(&health.maximum_capacity_percent, "%"))?;
                row(f, "Settings cycle count", Opt(&health.cycle_count, ""))?;
            }
        }

        if self.config.recording.show_history_in_home {
            writeln!(f)?;
            match self.latest {
                Some(record) => row(
                    f,
                    "Last recorded",
                    format_args!(
                        "#{} ({}), {} cycles",
                        record.id, record.record_type, record.cycle_count
                    ),
                )?,
                None => row(f, "Last recorded", "never")?,
            }
        }
        Ok(())
    }
}

/// History table, newest first, dates shown in `tz`.
pub struct HistoryTable<'a, Tz: TimeZone> {
    pub records: &'a [HistoryRecord],
    pub config: &'a Config,
    pub tz: &'a Tz,
}

impl<Tz> Display for HistoryTable<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return writeln!(f, "No history recorded.");
        }

        let show_design = self.config.recording.show_design_capacity;
        write!(f, "{:>6}  {:<16}  {:<13}  {:>6}  {:>7}", "ID", "DATE", "TYPE", "CYCLES", "HEALTH")?;
        if show_design {
            write!(f, "  {:>8}  {:>8}", "FULL", "DESIGN")?;
        }
        writeln!(f)?;

        for record in self.records {
            let date = record
                .created_at()
                .map(|at| at.with_timezone(self.tz).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| MISSING.to_owned());
            let health = record
                .health(self.config.display.rounding)
                .map(|h| format!("{h}%"))
                .unwrap_or_else(|| MISSING.to_owned());
            write!(
                f,
                "{:>6}  {:<16}  {:<13}  {:>6}  {:>7}",
                record.id,
                date,
                record.record_type.to_string(),
                record.cycle_count,
                health
            )?;
            if show_design {
                write!(
                    f,
                    "  {:>8}  {:>8}",
                    Opt(&record.nominal_charge_capacity, "").to_string(),
                    Opt(&record.design_capacity, "").to_string()
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub struct SettingsView<'a>(pub &'a Config);

impl Display for SettingsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Config {
            display,
            recording,
            persistence,
        } = self.0;
        let frequency = recording.record_frequency;
        row(f, "rounding", display.rounding)?;
        row(
            f,
            "recording",
            if frequency.enabled { "enabled" } else { "disabled" },
        )?;
        row(f, "record-frequency", frequency.mode.name())?;
        row(f, "auto-refresh", display.auto_refresh)?;
        row(f, "refresh-interval", format_args!("{}s", display.refresh_interval.as_secs()))?;
        row(f, "force-show-charging-data", display.force_show_charging_data)?;
        row(f, "show-settings-battery-info", display.show_settings_battery_info)?;
        row(f, "show-history-in-home", recording.show_history_in_home)?;
        row(f, "show-design-capacity", recording.show_design_capacity)?;
        match &persistence.database_path {
            Some(path) => row(f, "database", path.display())?,
            None => row(f, "database", "in memory")?,
        }
        row(f, "export-dir", persistence.export_dir().display())
    }
}

/// One line describing what a recording attempt did.
pub fn outcome(outcome: &RecordOutcome) -> String {
    match outcome {
        RecordOutcome::Recorded(record) => {
            format!("Recorded #{} ({}).", record.id, record.record_type)
        }
        RecordOutcome::Disabled => "Recording is disabled.".to_owned(),
        RecordOutcome::ManualOnly => "Recording is manual only; use --manual.".to_owned(),
        RecordOutcome::Unchanged => "Nothing new to record.".to_owned(),
        RecordOutcome::Incomplete => "Reading lacks cycle count or capacity.".to_owned(),
        RecordOutcome::Failed => "Failed to write the record.".to_owned(),
    }
}

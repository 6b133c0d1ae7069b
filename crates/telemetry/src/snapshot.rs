#![forbid(unsafe_code)]

use crate::manufacturer;
use serde::Serialize;

/// One decoded reading of the battery registry.
///
/// Every field is optional: `None` means the source did not report it, which
/// is not the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub serial_number: Option<String>,

    /// Millivolts.
    pub voltage: Option<i64>,
    /// Milliamps, negative while discharging.
    pub instant_amperage: Option<i64>,
    pub amperage: Option<i64>,
    /// State of charge in percent.
    pub current_capacity: Option<i64>,
    /// Remaining charge in mAh.
    pub raw_current_capacity: Option<i64>,
    pub absolute_capacity: Option<i64>,

    pub design_capacity: Option<i64>,
    pub nominal_charge_capacity: Option<i64>,

    pub is_charging: Option<bool>,
    pub fully_charged: Option<bool>,
    pub external_connected: Option<bool>,
    pub cycle_count: Option<i64>,
    /// Hundredths of a degree Celsius.
    pub temperature: Option<i64>,
    pub virtual_temperature: Option<i64>,
    /// Minutes.
    pub avg_time_to_empty: Option<i64>,
    pub update_time: Option<i64>,
    pub boot_path_updated: Option<i64>,

    /// Health percentage derived from nominal and design capacity.
    pub maximum_capacity: Option<String>,

    pub battery_data: Option<BatteryData>,
    pub lifetime_data: Option<LifetimeData>,
    pub kiosk_mode: Option<KioskMode>,
    pub adapter_details: Option<AdapterDetails>,
    pub charger_data: Option<ChargerData>,
}

impl TelemetrySnapshot {
    /// Temperature in degrees Celsius with two decimals.
    pub fn temperature_celsius(&self) -> Option<String> {
        self.temperature
            .map(|t| format!("{:.2}", t as f64 / 100.0))
    }

    pub fn manufacturer(&self) -> Option<&'static str> {
        self.serial_number
            .as_deref()
            .and_then(manufacturer::manufacturer)
    }

    pub fn masked_serial(&self) -> Option<String> {
        self.serial_number.as_deref().map(manufacturer::mask_serial)
    }

    /// Charger details are only meaningful while charging, unless forced.
    pub fn shows_charger_data(&self, force: bool) -> bool {
        force || self.is_charging == Some(true)
    }
}

/// Gas-gauge chemistry data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatteryData {
    pub algo_chem_id: Option<i64>,
    pub cycle_count: Option<i64>,
    pub design_capacity: Option<i64>,
    pub dynamic_soc1_vcut: Option<i64>,
    pub maximum_fcc: Option<i64>,
    pub minimum_fcc: Option<i64>,
    pub temperature_samples: Option<i64>,
    pub state_of_charge: Option<i64>,
}

/// Statistics accumulated over the life of the pack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifetimeData {
    pub average_temperature: Option<i64>,
    pub cycle_count_last_qmax: Option<i64>,
    pub maximum_charge_current: Option<i64>,
    pub minimum_pack_voltage: Option<i64>,
    pub maximum_qmax: Option<i64>,
    pub minimum_qmax: Option<i64>,
    pub total_operating_time: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KioskMode {
    pub full_charge_voltage: Option<i64>,
    pub high_soc_days: Option<i64>,
    pub last_high_soc_hours: Option<i64>,
    pub mode: Option<i64>,
}

/// The connected power adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdapterDetails {
    pub adapter_id: Option<i64>,
    pub adapter_voltage: Option<i64>,
    pub current: Option<i64>,
    pub description: Option<String>,
    pub family_code: Option<String>,
    pub is_wireless: Option<bool>,
    pub pmu_configuration: Option<i64>,
    pub shared_source: Option<bool>,
    pub source: Option<i64>,
    pub usb_hvc_hvc_index: Option<i64>,
    pub usb_hvc_menu: Vec<UsbHvcOption>,
    pub voltage: Option<i64>,
    pub watts: Option<i64>,
}

/// One USB high-voltage charging profile offered by the adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsbHvcOption {
    pub index: i64,
    pub max_current: i64,
    pub max_voltage: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChargerData {
    pub charger_id: Option<String>,
    pub charging_current: Option<i64>,
    pub charging_voltage: Option<i64>,
    pub not_charging_reason: Option<i64>,
    pub vac_voltage_limit: Option<i64>,
}

/// Health figures as reported by the system settings rather than the gauge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsHealth {
    pub cycle_count: Option<i64>,
    pub maximum_capacity_percent: Option<i64>,
}

//! Mapping from the untyped registry dictionary to [`TelemetrySnapshot`].
//!
//! Decoding never fails. A key that is missing or carries a value of the
//! wrong type leaves the field `None`. Flags follow the registry convention:
//! the integer `1` is `true`, any other integer is `false`.

#![forbid(unsafe_code)]

use crate::health::health_percent;
use crate::snapshot::{
    AdapterDetails, BatteryData, ChargerData, KioskMode, LifetimeData, SettingsHealth,
    TelemetrySnapshot, UsbHvcOption,
};
use config::RoundingPolicy;
use serde_json::{Map, Value};

/// The key/value dictionary handed over by the telemetry source.
pub type RawTelemetry = Map<String, Value>;

/// Types decodable from a nested registry dictionary.
pub trait FromRaw: Sized {
    fn from_raw(raw: &RawTelemetry) -> Self;
}

fn int(raw: &RawTelemetry, key: &str) -> Option<i64> {
    raw.get(key)?.as_i64()
}

fn text(raw: &RawTelemetry, key: &str) -> Option<String> {
    raw.get(key)?.as_str().map(str::to_owned)
}

fn flag(raw: &RawTelemetry, key: &str) -> Option<bool> {
    int(raw, key).map(|value| value == 1)
}

fn group<T: FromRaw>(raw: &RawTelemetry, key: &str) -> Option<T> {
    raw.get(key)?.as_object().map(T::from_raw)
}

/// Decode a full snapshot, deriving the health percentage with `rounding`.
pub fn decode(raw: &RawTelemetry, rounding: RoundingPolicy) -> TelemetrySnapshot {
    let design_capacity = int(raw, "DesignCapacity");
    let nominal_charge_capacity = int(raw, "NominalChargeCapacity");
    let maximum_capacity = match (nominal_charge_capacity, design_capacity) {
        (Some(nominal), Some(design)) => health_percent(nominal, design, rounding),
        _ => None,
    };

    TelemetrySnapshot {
        serial_number: text(raw, "Serial"),
        voltage: int(raw, "Voltage"),
        instant_amperage: int(raw, "InstantAmperage"),
        amperage: int(raw, "Amperage"),
        current_capacity: int(raw, "CurrentCapacity"),
        raw_current_capacity: int(raw, "AppleRawCurrentCapacity"),
        absolute_capacity: int(raw, "AbsoluteCapacity"),
        design_capacity,
        nominal_charge_capacity,
        is_charging: flag(raw, "IsCharging"),
        fully_charged: flag(raw, "FullyCharged"),
        external_connected: flag(raw, "AppleRawExternalConnected"),
        cycle_count: int(raw, "CycleCount"),
        temperature: int(raw, "Temperature"),
        virtual_temperature: int(raw, "VirtualTemperature"),
        avg_time_to_empty: int(raw, "AvgTimeToEmpty"),
        update_time: int(raw, "UpdateTime"),
        boot_path_updated: int(raw, "BootPathUpdated"),
        maximum_capacity,
        battery_data: group(raw, "BatteryData"),
        lifetime_data: group(raw, "LifetimeData"),
        kiosk_mode: group(raw, "KioskMode"),
        adapter_details: group(raw, "AdapterDetails"),
        charger_data: group(raw, "ChargerData"),
    }
}

impl FromRaw for BatteryData {
    fn from_raw(raw: &RawTelemetry) -> Self {
        Self {
            algo_chem_id: int(raw, "AlgoChemID"),
            cycle_count: int(raw, "CycleCount"),
            design_capacity: int(raw, "DesignCapacity"),
            dynamic_soc1_vcut: int(raw, "DynamicSoc1Vcut"),
            maximum_fcc: int(raw, "MaximumFCC"),
            minimum_fcc: int(raw, "MinimumFCC"),
            temperature_samples: int(raw, "TemperatureSamples"),
            state_of_charge: int(raw, "StateOfCharge"),
        }
    }
}

impl FromRaw for LifetimeData {
    fn from_raw(raw: &RawTelemetry) -> Self {
        Self {
            average_temperature: int(raw, "AverageTemperature"),
            cycle_count_last_qmax: int(raw, "CycleCountLastQmax"),
            maximum_charge_current: int(raw, "MaximumChargeCurrent"),
            minimum_pack_voltage: int(raw, "MinimumPackVoltage"),
            maximum_qmax: int(raw, "MaximumQmax"),
            minimum_qmax: int(raw, "MinimumQmax"),
            total_operating_time: int(raw, "TotalOperatingTime"),
        }
    }
}

impl FromRaw for KioskMode {
    fn from_raw(raw: &RawTelemetry) -> Self {
        Self {
            full_charge_voltage: int(raw, "KioskModeFullChargeVoltage"),
            high_soc_days: int(raw, "KioskModeHighSocDays"),
            last_high_soc_hours: int(raw, "KioskModeLastHighSocHours"),
            mode: int(raw, "KioskModeMode"),
        }
    }
}

impl FromRaw for AdapterDetails {
    fn from_raw(raw: &RawTelemetry) -> Self {
        let usb_hvc_menu = raw
            .get("UsbHvcMenu")
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(Value::as_object)
                    .map(UsbHvcOption::from_raw)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            adapter_id: int(raw, "AdapterID"),
            adapter_voltage: int(raw, "AdapterVoltage"),
            current: int(raw, "Current"),
            description: text(raw, "Description"),
            family_code: text(raw, "FamilyCode"),
            is_wireless: flag(raw, "IsWireless"),
            pmu_configuration: int(raw, "PMUConfiguration"),
            shared_source: flag(raw, "SharedSource"),
            source: int(raw, "Source"),
            usb_hvc_hvc_index: int(raw, "UsbHvcHvcIndex"),
            usb_hvc_menu,
            voltage: int(raw, "Voltage"),
            watts: int(raw, "Watts"),
        }
    }
}

impl FromRaw for UsbHvcOption {
    fn from_raw(raw: &RawTelemetry) -> Self {
        Self {
            index: int(raw, "Index").unwrap_or_default(),
            max_current: int(raw, "MaxCurrent").unwrap_or_default(),
            max_voltage: int(raw, "MaxVoltage").unwrap_or_default(),
        }
    }
}

impl FromRaw for ChargerData {
    fn from_raw(raw: &RawTelemetry) -> Self {
        Self {
            charger_id: text(raw, "ChargerID"),
            charging_current: int(raw, "ChargingCurrent"),
            charging_voltage: int(raw, "ChargingVoltage"),
            not_charging_reason: int(raw, "NotChargingReason"),
            vac_voltage_limit: int(raw, "VacVoltageLimit"),
        }
    }
}

impl FromRaw for SettingsHealth {
    fn from_raw(raw: &RawTelemetry) -> Self {
        Self {
            cycle_count: int(raw, "CycleCount"),
            maximum_capacity_percent: int(raw, "Maximum Capacity Percent"),
        }
    }
}

#![forbid(unsafe_code)]

use config::RoundingPolicy;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use telemetry::{
    AdapterDetails, BatteryData, KioskMode, RawTelemetry, TelemetrySnapshot, UsbHvcOption, decode,
};

fn object(value: Value) -> RawTelemetry {
    value.as_object().cloned().expect("fixture is an object")
}

#[test]
fn minimal_reading_with_default_rounding() {
    let raw = object(json!({
        "NominalChargeCapacity": 4200,
        "DesignCapacity": 4500,
        "CycleCount": 120,
    }));

    let snapshot = decode(&raw, RoundingPolicy::default());

    assert_eq!(snapshot.maximum_capacity.as_deref(), Some("94"));
    assert_eq!(snapshot.cycle_count, Some(120));
    assert_eq!(snapshot.is_charging, None);
    assert_eq!(snapshot.battery_data, None);
}

#[test]
fn full_registry_dump() {
    let raw = object(json!({
        "Serial": "F8Y2301ABCDE",
        "Voltage": 4312,
        "InstantAmperage": -412,
        "Amperage": -398,
        "CurrentCapacity": 81,
        "AppleRawCurrentCapacity": 2843,
        "DesignCapacity": 3349,
        "NominalChargeCapacity": 3012,
        "IsCharging": 0,
        "FullyCharged": 0,
        "AppleRawExternalConnected": 1,
        "CycleCount": 287,
        "Temperature": 3087,
        "AvgTimeToEmpty": 65535,
        "BootPathUpdated": 1_700_000_000,
        "BatteryData": {
            "AlgoChemID": 12345,
            "CycleCount": 287,
            "DesignCapacity": 3349,
            "MaximumFCC": 3190,
            "MinimumFCC": 2980,
            "StateOfCharge": 81,
        },
        "KioskMode": {
            "KioskModeMode": 0,
            "KioskModeHighSocDays": 3,
        },
        "AdapterDetails": {
            "Watts": 20,
            "Description": "pd charger",
            "IsWireless": 0,
            "SharedSource": 1,
            "UsbHvcMenu": [{ "Index": 0, "MaxCurrent": 3000, "MaxVoltage": 5000 }],
        },
    }));

    let snapshot = decode(&raw, RoundingPolicy::Keep);

    assert_eq!(snapshot.serial_number.as_deref(), Some("F8Y2301ABCDE"));
    assert_eq!(snapshot.manufacturer(), Some("Sunwoda"));
    assert_eq!(snapshot.masked_serial().as_deref(), Some("F8Y******CDE"));
    assert_eq!(snapshot.maximum_capacity.as_deref(), Some("89.94"));
    assert_eq!(snapshot.temperature_celsius().as_deref(), Some("30.87"));
    assert_eq!(snapshot.is_charging, Some(false));
    assert_eq!(snapshot.external_connected, Some(true));
    assert!(!snapshot.shows_charger_data(false));
    assert!(snapshot.shows_charger_data(true));

    assert_eq!(
        snapshot.battery_data,
        Some(BatteryData {
            algo_chem_id: Some(12345),
            cycle_count: Some(287),
            design_capacity: Some(3349),
            dynamic_soc1_vcut: None,
            maximum_fcc: Some(3190),
            minimum_fcc: Some(2980),
            temperature_samples: None,
            state_of_charge: Some(81),
        })
    );
    assert_eq!(
        snapshot.kiosk_mode,
        Some(KioskMode {
            full_charge_voltage: None,
            high_soc_days: Some(3),
            last_high_soc_hours: None,
            mode: Some(0),
        })
    );
    assert_eq!(
        snapshot.adapter_details,
        Some(AdapterDetails {
            watts: Some(20),
            description: Some("pd charger".into()),
            is_wireless: Some(false),
            shared_source: Some(true),
            usb_hvc_menu: vec![UsbHvcOption {
                index: 0,
                max_current: 3000,
                max_voltage: 5000,
            }],
            ..AdapterDetails::default()
        })
    );
    assert_eq!(snapshot.lifetime_data, None);
    assert_eq!(snapshot.charger_data, None);
}

#[test]
fn empty_dictionary_is_all_unknown() {
    assert_eq!(
        decode(&RawTelemetry::new(), RoundingPolicy::Floor),
        TelemetrySnapshot::default()
    );
}

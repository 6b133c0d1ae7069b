#![forbid(unsafe_code)]

mod decode;
mod error;
pub mod health;
pub mod manufacturer;
mod snapshot;
mod source;

pub use decode::{FromRaw, RawTelemetry, decode};
pub use error::Error;
pub use health::health_percent;
pub use snapshot::{
    AdapterDetails, BatteryData, ChargerData, KioskMode, LifetimeData, SettingsHealth,
    TelemetrySnapshot, UsbHvcOption,
};
pub use source::{FixedSource, JsonFileSource, TelemetrySource};

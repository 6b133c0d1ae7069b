#![forbid(unsafe_code)]

use crate::{Error, RawTelemetry};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{trace, warn};

/// Supplier of the raw battery registry dictionary.
///
/// Returns `None` when the data is unavailable, e.g. for lack of privilege.
pub trait TelemetrySource: Send + Sync {
    fn raw_telemetry(&self) -> Option<RawTelemetry>;
}

/// Reads the registry dictionary from a JSON file dumped by a helper.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> Result<RawTelemetry, Error> {
        let text = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::NotAnObject(self.path.clone())),
        }
    }
}

impl TelemetrySource for JsonFileSource {
    fn raw_telemetry(&self) -> Option<RawTelemetry> {
        match self.read() {
            Ok(raw) => {
                trace!(path = %self.path.display(), keys = raw.len(), "telemetry read");
                Some(raw)
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "telemetry unavailable");
                None
            }
        }
    }
}

/// A source that always returns the same dictionary.
#[derive(Debug, Clone, Default)]
pub struct FixedSource(pub Option<RawTelemetry>);

impl TelemetrySource for FixedSource {
    fn raw_telemetry(&self) -> Option<RawTelemetry> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("battery.json");
        std::fs::write(&path, r#"{"CycleCount": 12, "IsCharging": 1}"#).unwrap();

        let raw = JsonFileSource::new(&path).raw_telemetry().unwrap();
        assert_eq!(raw.get("CycleCount").and_then(Value::as_i64), Some(12));
    }

    #[test]
    fn failures_are_absent() {
        let dir = tempdir().unwrap();
        let missing = JsonFileSource::new(dir.path().join("missing.json"));
        assert!(missing.raw_telemetry().is_none());
        assert!(matches!(missing.read(), Err(Error::ReadFailed(_))));

        let array = dir.path().join("array.json");
        std::fs::write(&array, "[1, 2]").unwrap();
        assert!(matches!(
            JsonFileSource::new(&array).read(),
            Err(Error::NotAnObject(_))
        ));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ nope").unwrap();
        assert!(matches!(
            JsonFileSource::new(&garbage).read(),
            Err(Error::ParseFailed(_))
        ));
    }
}

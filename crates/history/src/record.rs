#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use config::RoundingPolicy;
use serde::Serialize;
use std::fmt;
use telemetry::{TelemetrySnapshot, health_percent};

/// How a history entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordType {
    /// Written by the recorder on its own.
    Automatic,
    /// Live reading captured on request.
    ManualAdd,
    /// Values typed in by the user: percentage and cycle count only.
    ManualRecord,
}

impl RecordType {
    /// Ordinal `2` belonged to OCR imports, which no longer exist. It and any
    /// unknown ordinal read back as [`RecordType::Automatic`].
    pub fn from_ordinal(value: i64) -> Self {
        match value {
            1 => Self::ManualAdd,
            3 => Self::ManualRecord,
            _ => Self::Automatic,
        }
    }

    pub fn ordinal(self) -> i64 {
        match self {
            Self::Automatic => 0,
            Self::ManualAdd => 1,
            Self::ManualRecord => 3,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Automatic => "automatic",
            Self::ManualAdd => "manual-add",
            Self::ManualRecord => "manual-record",
        })
    }
}

/// A persisted history entry. Never modified after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    /// Epoch seconds.
    pub create_date: i64,
    pub record_type: RecordType,
    pub cycle_count: i64,
    pub nominal_charge_capacity: Option<i64>,
    pub design_capacity: Option<i64>,
    /// Only set for hand-entered records.
    pub maximum_capacity: Option<String>,
}

impl HistoryRecord {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.create_date, 0)
    }

    /// The stored percentage for hand-entered records, otherwise recomputed
    /// from nominal and design capacity.
    pub fn health(&self, rounding: RoundingPolicy) -> Option<String> {
        if let Some(stored) = &self.maximum_capacity {
            return Some(stored.clone());
        }
        match (self.nominal_charge_capacity, self.design_capacity) {
            (Some(nominal), Some(design)) => health_percent(nominal, design, rounding),
            _ => None,
        }
    }
}

/// The values the recorder compares between readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reading {
    pub cycle_count: i64,
    pub nominal_charge_capacity: i64,
    pub design_capacity: i64,
}

impl Reading {
    pub fn new(cycle_count: i64, nominal_charge_capacity: i64, design_capacity: i64) -> Self {
        Self {
            cycle_count,
            nominal_charge_capacity,
            design_capacity,
        }
    }

    /// `None` unless the snapshot carries all three values.
    pub fn from_snapshot(snapshot: &TelemetrySnapshot) -> Option<Self> {
        Some(Self::new(
            snapshot.cycle_count?,
            snapshot.nominal_charge_capacity?,
            snapshot.design_capacity?,
        ))
    }
}

/// A record waiting to be inserted. The store assigns the id and, unless
/// one is carried here, the creation date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub record_type: RecordType,
    pub create_date: Option<i64>,
    pub cycle_count: i64,
    pub nominal_charge_capacity: Option<i64>,
    pub design_capacity: Option<i64>,
    pub maximum_capacity: Option<String>,
}

impl NewRecord {
    fn from_reading(record_type: RecordType, reading: Reading) -> Self {
        Self {
            record_type,
            create_date: None,
            cycle_count: reading.cycle_count,
            nominal_charge_capacity: Some(reading.nominal_charge_capacity),
            design_capacity: Some(reading.design_capacity),
            maximum_capacity: None,
        }
    }

    pub fn automatic(reading: Reading) -> Self {
        Self::from_reading(RecordType::Automatic, reading)
    }

    pub fn manual_capture(reading: Reading) -> Self {
        Self::from_reading(RecordType::ManualAdd, reading)
    }

    /// A record typed in by hand: no capacities, just the percentage.
    pub fn hand_entered(cycle_count: i64, maximum_capacity: impl Into<String>) -> Self {
        Self {
            record_type: RecordType::ManualRecord,
            create_date: None,
            cycle_count,
            nominal_charge_capacity: None,
            design_capacity: None,
            maximum_capacity: Some(maximum_capacity.into()),
        }
    }

    /// Keep a caller-supplied creation date instead of the insert time.
    pub fn with_create_date(self, epoch_seconds: i64) -> Self {
        Self {
            create_date: Some(epoch_seconds),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_ocr_ordinal_reads_as_automatic() {
        assert_eq!(RecordType::from_ordinal(2), RecordType::Automatic);
        assert_eq!(RecordType::from_ordinal(99), RecordType::Automatic);
        for kind in [
            RecordType::Automatic,
            RecordType::ManualAdd,
            RecordType::ManualRecord,
        ] {
            assert_eq!(RecordType::from_ordinal(kind.ordinal()), kind);
        }
    }

    #[test]
    fn health_prefers_stored_percentage() {
        let mut record = HistoryRecord {
            id: 1,
            create_date: 0,
            record_type: RecordType::Automatic,
            cycle_count: 10,
            nominal_charge_capacity: Some(4200),
            design_capacity: Some(4500),
            maximum_capacity: None,
        };
        assert_eq!(record.health(RoundingPolicy::Floor).as_deref(), Some("93"));
        assert_eq!(record.health(RoundingPolicy::Ceiling).as_deref(), Some("94"));

        record.maximum_capacity = Some("91".into());
        assert_eq!(record.health(RoundingPolicy::Floor).as_deref(), Some("91"));

        record.maximum_capacity = None;
        record.design_capacity = None;
        assert_eq!(record.health(RoundingPolicy::Floor), None);
    }

    #[test]
    fn reading_needs_all_values() {
        let mut snapshot = TelemetrySnapshot {
            cycle_count: Some(5),
            nominal_charge_capacity: Some(3000),
            design_capacity: Some(3200),
            ..TelemetrySnapshot::default()
        };
        assert_eq!(
            Reading::from_snapshot(&snapshot),
            Some(Reading::new(5, 3000, 3200))
        );

        snapshot.design_capacity = None;
        assert_eq!(Reading::from_snapshot(&snapshot), None);
    }

    #[test]
    fn constructors_tag_provenance() {
        let reading = Reading::new(1, 2, 3);
        assert_eq!(NewRecord::automatic(reading).record_type, RecordType::Automatic);
        assert_eq!(NewRecord::manual_capture(reading).record_type, RecordType::ManualAdd);

        let typed = NewRecord::hand_entered(40, "97").with_create_date(1_600_000_000);
        assert_eq!(typed.record_type, RecordType::ManualRecord);
        assert_eq!(typed.create_date, Some(1_600_000_000));
        assert_eq!(typed.nominal_charge_capacity, None);
    }
}

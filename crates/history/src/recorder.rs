#![forbid(unsafe_code)]

use crate::record::{HistoryRecord, NewRecord, Reading};
use crate::store::{HistoryStore, StoreView};
use chrono::{Local, TimeZone};
use config::{RecordFrequency, RecordingConfig};
use parking_lot::RwLock;
use telemetry::TelemetrySnapshot;
use tracing::{debug, info, warn};

/// Whether an automatic reading should become a new record.
///
/// An empty history always takes the first reading. After that the mode
/// decides: a change means a different cycle count or nominal capacity from
/// the newest record, a new day means the newest record was written on an
/// earlier calendar date in `tz`.
pub fn should_record<Tz: TimeZone>(
    mode: RecordFrequency,
    view: &StoreView<'_>,
    reading: &Reading,
    tz: &Tz,
) -> bool {
    let Some(latest) = view.latest.filter(|_| view.count > 0) else {
        return true;
    };

    let changed = latest.cycle_count != reading.cycle_count
        || latest.nominal_charge_capacity != Some(reading.nominal_charge_capacity);
    let new_day = match latest.created_at() {
        Some(last) => {
            last.with_timezone(tz).date_naive() != view.now.with_timezone(tz).date_naive()
        }
        None => true,
    };

    match mode {
        RecordFrequency::Automatic => new_day || changed,
        RecordFrequency::DataChanged => changed,
        RecordFrequency::EveryDay => new_day,
        RecordFrequency::Manual => false,
    }
}

/// Result of one recording attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(HistoryRecord),
    /// Recording is switched off.
    Disabled,
    /// Mode is manual and the attempt was not.
    ManualOnly,
    /// The policy found nothing worth keeping.
    Unchanged,
    /// The snapshot lacked cycle count or a capacity.
    Incomplete,
    /// Storage refused the write.
    Failed,
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Applies the recording policy to incoming readings.
#[derive(Debug)]
pub struct Recorder<Tz: TimeZone = Local> {
    store: HistoryStore,
    config: RwLock<RecordingConfig>,
    tz: Tz,
}

impl Recorder<Local> {
    pub fn new(store: HistoryStore, config: RecordingConfig) -> Self {
        Self::with_timezone(store, config, Local)
    }
}

impl<Tz> Recorder<Tz>
where
    Tz: TimeZone + Send + Sync,
{
    pub fn with_timezone(store: HistoryStore, config: RecordingConfig, tz: Tz) -> Self {
        Self {
            store,
            config: RwLock::new(config),
            tz,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn config(&self) -> RecordingConfig {
        *self.config.read()
    }

    pub fn set_config(&self, config: RecordingConfig) {
        *self.config.write() = config;
    }

    /// Record `reading` if policy allows. A manual attempt always writes a
    /// [`ManualAdd`](crate::RecordType::ManualAdd) record, regardless of
    /// mode or the enabled flag.
    pub async fn maybe_record(&self, manual: bool, reading: Reading) -> RecordOutcome {
        let (record, config) = if manual {
            (NewRecord::manual_capture(reading), None)
        } else {
            let config = self.config();
            if !config.enabled {
                debug!("recording disabled");
                return RecordOutcome::Disabled;
            }
            if config.mode == RecordFrequency::Manual {
                debug!("recording is manual only");
                return RecordOutcome::ManualOnly;
            }
            (NewRecord::automatic(reading), Some(config))
        };

        let tz = &self.tz;
        let decision = self
            .store
            .insert_when(record, |view| match config {
                Some(config) => should_record(config.mode, view, &reading, tz),
                None => true,
            })
            .await;

        match decision {
            Ok(Some(record)) => {
                info!(id = record.id, record_type = %record.record_type, "battery reading recorded");
                RecordOutcome::Recorded(record)
            }
            Ok(None) => RecordOutcome::Unchanged,
            Err(err) => {
                warn!(%err, "failed to record battery reading");
                RecordOutcome::Failed
            }
        }
    }

    /// [`maybe_record`](Self::maybe_record) for a decoded snapshot.
    pub async fn record_snapshot(&self, manual: bool, snapshot: &TelemetrySnapshot) -> RecordOutcome {
        match Reading::from_snapshot(snapshot) {
            Some(reading) => self.maybe_record(manual, reading).await,
            None => {
                debug!("snapshot lacks cycle count or capacity");
                RecordOutcome::Incomplete
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;
    use chrono::{DateTime, FixedOffset, Utc};
    use proptest::prelude::*;

    fn latest(create_date: i64, cycle_count: i64, nominal: i64) -> HistoryRecord {
        HistoryRecord {
            id: 1,
            create_date,
            record_type: RecordType::Automatic,
            cycle_count,
            nominal_charge_capacity: Some(nominal),
            design_capacity: Some(4500),
            maximum_capacity: None,
        }
    }

    fn view(latest: Option<&HistoryRecord>, now: i64) -> StoreView<'_> {
        StoreView {
            count: u64::from(latest.is_some()),
            latest,
            now: DateTime::<Utc>::from_timestamp(now, 0).unwrap(),
        }
    }

    #[test]
    fn empty_history_takes_first_reading() {
        let reading = Reading::new(1, 4000, 4500);
        for mode in RecordFrequency::ALL {
            if mode == RecordFrequency::Manual {
                continue;
            }
            assert!(should_record(mode, &view(None, 0), &reading, &Utc));
        }
    }

    #[test]
    fn days_follow_the_given_timezone() {
        // 2023-11-14 22:13:20 UTC, then two hours later.
        let base = 1_700_000_000;
        let last = latest(base, 10, 4000);
        let reading = Reading::new(10, 4000, 4500);
        let v = view(Some(&last), base + 2 * 3600);

        assert!(should_record(RecordFrequency::EveryDay, &v, &reading, &Utc));
        let plus3 = FixedOffset::east_opt(3 * 3600).unwrap();
        assert!(!should_record(RecordFrequency::EveryDay, &v, &reading, &plus3));
        let minus5 = FixedOffset::west_opt(5 * 3600).unwrap();
        assert!(!should_record(RecordFrequency::EveryDay, &v, &reading, &minus5));
        assert!(!should_record(RecordFrequency::DataChanged, &v, &reading, &Utc));
    }

    #[test]
    fn manual_mode_never_records_automatically() {
        let last = latest(0, 1, 1);
        let reading = Reading::new(2, 2, 2);
        assert!(!should_record(
            RecordFrequency::Manual,
            &view(Some(&last), 86_400 * 10),
            &reading,
            &Utc
        ));
    }

    proptest! {
        #[test]
        fn automatic_is_change_or_new_day(
            last_date in 0i64..4_000_000_000,
            elapsed in 0i64..400_000,
            cycles in (0i64..5, 0i64..5),
            nominal in (3000i64..3003, 3000i64..3003),
        ) {
            let last = latest(last_date, cycles.0, nominal.0);
            let reading = Reading::new(cycles.1, nominal.1, 4500);
            let v = view(Some(&last), last_date + elapsed);

            let automatic = should_record(RecordFrequency::Automatic, &v, &reading, &Utc);
            let changed = should_record(RecordFrequency::DataChanged, &v, &reading, &Utc);
            let new_day = should_record(RecordFrequency::EveryDay, &v, &reading, &Utc);
            prop_assert_eq!(automatic, changed || new_day);
            prop_assert_eq!(changed, cycles.0 != cycles.1 || nominal.0 != nominal.1);
        }
    }
}

#![forbid(unsafe_code)]

//! Battery history: the record model, its SQLite store, the recording
//! policy and CSV export.

pub mod clock;
mod error;
pub mod export;
pub mod persistence;
mod record;
mod recorder;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::Error;
pub use persistence::{HistoryRepository, SqliteRepository};
pub use record::{HistoryRecord, NewRecord, Reading, RecordType};
pub use recorder::{RecordOutcome, Recorder, should_record};
pub use store::{HistoryStore, StoreView};

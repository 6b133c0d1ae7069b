#![forbid(unsafe_code)]

mod repo;

pub use repo::{HistoryRepository, LEGACY_TABLE, SqliteRepository};

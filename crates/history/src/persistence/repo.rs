#![forbid(unsafe_code)]

use crate::error::Error;
use crate::record::{HistoryRecord, NewRecord, RecordType};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Table written by the first generation of the app. Imported once, then
/// renamed out of the way.
pub const LEGACY_TABLE: &str = "BatteryDataRecords";

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Insert `record` stamped with `create_date` and return it with its id.
    async fn insert(&self, record: &NewRecord, create_date: i64) -> Result<HistoryRecord, Error>;
    /// All records, newest first.
    async fn fetch_all(&self) -> Result<Vec<HistoryRecord>, Error>;
    /// The newest record, if any.
    async fn fetch_latest(&self) -> Result<Option<HistoryRecord>, Error>;
    async fn count(&self) -> Result<u64, Error>;
    /// Whether a record with `id` existed and was removed.
    async fn delete_by_id(&self, id: i64) -> Result<bool, Error>;
    /// Remove every record, returning how many were removed.
    async fn delete_all(&self) -> Result<u64, Error>;
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    create_date: i64,
    record_type: i64,
    cycle_count: i64,
    nominal_charge_capacity: Option<i64>,
    design_capacity: Option<i64>,
    maximum_capacity: Option<String>,
}

impl From<HistoryRow> for HistoryRecord {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            create_date: row.create_date,
            record_type: RecordType::from_ordinal(row.record_type),
            cycle_count: row.cycle_count,
            nominal_charge_capacity: row.nominal_charge_capacity,
            design_capacity: row.design_capacity,
            maximum_capacity: row.maximum_capacity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Create a repository backed by a SQLite database file.
    pub async fn new(path: PathBuf) -> Result<Self, Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        debug!(path = %path.display(), "history database opened");
        Self::prepare(pool).await
    }

    /// A private database that lives as long as the repository.
    pub async fn in_memory() -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // The single connection must never be recycled or the data is gone.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::prepare(pool).await
    }

    async fn prepare(pool: SqlitePool) -> Result<Self, Error> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        let repo = Self { pool };
        repo.import_legacy().await?;
        Ok(repo)
    }

    /// Copy rows from the first-generation table, keeping their dates.
    ///
    /// That table stored `0` for capacities on hand-entered rows and had an
    /// OCR provenance (ordinal 2) that is folded into automatic.
    async fn import_legacy(&self) -> Result<u64, Error> {
        let legacy: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(LEGACY_TABLE)
        .fetch_optional(&self.pool)
        .await?;
        if legacy.is_none() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let imported = sqlx::query(
            "INSERT INTO HistoryRecord \
                 (createDate, recordType, cycleCount, nominalChargeCapacity, designCapacity, maximumCapacity) \
             SELECT \
                 createDate, \
                 CASE recordType WHEN 2 THEN 0 ELSE recordType END, \
                 cycleCount, \
                 CASE WHEN maximumCapacity IS NULL THEN nominalChargeCapacity END, \
                 CASE WHEN maximumCapacity IS NULL THEN designCapacity END, \
                 maximumCapacity \
             FROM BatteryDataRecords ORDER BY id",
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();
        sqlx::query("ALTER TABLE BatteryDataRecords RENAME TO BatteryDataRecords_imported")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(imported, "imported legacy history records");
        Ok(imported)
    }
}

#[async_trait]
impl HistoryRepository for SqliteRepository {
    async fn insert(&self, record: &NewRecord, create_date: i64) -> Result<HistoryRecord, Error> {
        let id = sqlx::query(
            "INSERT INTO HistoryRecord \
                 (createDate, recordType, cycleCount, nominalChargeCapacity, designCapacity, maximumCapacity) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(create_date)
        .bind(record.record_type.ordinal())
        .bind(record.cycle_count)
        .bind(record.nominal_charge_capacity)
        .bind(record.design_capacity)
        .bind(record.maximum_capacity.as_deref())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(id, create_date, record_type = %record.record_type, "history record inserted");
        Ok(HistoryRecord {
            id,
            create_date,
            record_type: record.record_type,
            cycle_count: record.cycle_count,
            nominal_charge_capacity: record.nominal_charge_capacity,
            design_capacity: record.design_capacity,
            maximum_capacity: record.maximum_capacity.clone(),
        })
    }

    async fn fetch_all(&self) -> Result<Vec<HistoryRecord>, Error> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT id, createDate AS create_date, recordType AS record_type, \
                    cycleCount AS cycle_count, nominalChargeCapacity AS nominal_charge_capacity, \
                    designCapacity AS design_capacity, maximumCapacity AS maximum_capacity \
             FROM HistoryRecord ORDER BY createDate DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn fetch_latest(&self) -> Result<Option<HistoryRecord>, Error> {
        let row: Option<HistoryRow> = sqlx::query_as(
            "SELECT id, createDate AS create_date, recordType AS record_type, \
                    cycleCount AS cycle_count, nominalChargeCapacity AS nominal_charge_capacity, \
                    designCapacity AS design_capacity, maximumCapacity AS maximum_capacity \
             FROM HistoryRecord ORDER BY createDate DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn count(&self) -> Result<u64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM HistoryRecord")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, Error> {
        let removed = sqlx::query("DELETE FROM HistoryRecord WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    async fn delete_all(&self) -> Result<u64, Error> {
        let removed = sqlx::query("DELETE FROM HistoryRecord")
            .execute(&self.pool)
            .await?
            .rows_affected();
        info!(removed, "history cleared");
        Ok(removed)
    }
}

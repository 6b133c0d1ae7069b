#![forbid(unsafe_code)]

use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::export;
use crate::persistence::{HistoryRepository, SqliteRepository};
use crate::record::{HistoryRecord, NewRecord};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// What a conditional insert gets to look at before deciding.
#[derive(Debug, Clone, Copy)]
pub struct StoreView<'a> {
    pub count: u64,
    pub latest: Option<&'a HistoryRecord>,
    /// The creation date the new record would receive.
    pub now: DateTime<Utc>,
}

struct StoreInner {
    repo: Mutex<Box<dyn HistoryRepository>>,
    clock: Arc<dyn Clock>,
}

/// The one handle to the history database.
///
/// Clones share the same repository; every operation takes the same lock, so
/// callers on different tasks never interleave. Storage failures are logged
/// and turn into `false`, empty lists or `None`.
#[derive(Clone)]
pub struct HistoryStore(Arc<StoreInner>);

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish_non_exhaustive()
    }
}

impl HistoryStore {
    pub fn new(repo: impl HistoryRepository + 'static, clock: Arc<dyn Clock>) -> Self {
        let repo: Box<dyn HistoryRepository> = Box::new(repo);
        Self(Arc::new(StoreInner {
            repo: Mutex::new(repo),
            clock,
        }))
    }

    /// Open the database at `path`, or a private in-memory one when `None`.
    pub async fn open(path: Option<&Path>) -> Result<Self, Error> {
        let repo = match path {
            Some(path) => SqliteRepository::new(path.to_path_buf()).await?,
            None => SqliteRepository::in_memory().await?,
        };
        Ok(Self::new(repo, Arc::new(SystemClock)))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.0.clock.now()
    }

    fn create_date(&self, record: &NewRecord) -> i64 {
        record.create_date.unwrap_or_else(|| self.now().timestamp())
    }

    pub async fn insert(&self, record: NewRecord) -> bool {
        let create_date = self.create_date(&record);
        let repo = self.0.repo.lock().await;
        match repo.insert(&record, create_date).await {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "failed to insert history record");
                false
            }
        }
    }

    /// Insert `record` only if `decide` agrees, with no other access in
    /// between the look and the write.
    pub async fn insert_when<F>(
        &self,
        record: NewRecord,
        decide: F,
    ) -> Result<Option<HistoryRecord>, Error>
    where
        F: FnOnce(&StoreView<'_>) -> bool + Send,
    {
        let repo = self.0.repo.lock().await;
        let count = repo.count().await?;
        let latest = repo.fetch_latest().await?;
        let create_date = self.create_date(&record);
        let view = StoreView {
            count,
            latest: latest.as_ref(),
            now: DateTime::from_timestamp(create_date, 0).unwrap_or_default(),
        };

        if !decide(&view) {
            debug!(count, "insert declined");
            return Ok(None);
        }
        repo.insert(&record, create_date).await.map(Some)
    }

    /// Every record, newest first.
    pub async fn fetch_all(&self) -> Vec<HistoryRecord> {
        let repo = self.0.repo.lock().await;
        repo.fetch_all().await.unwrap_or_else(|err| {
            warn!(%err, "failed to read history");
            Vec::new()
        })
    }

    pub async fn fetch_latest(&self) -> Option<HistoryRecord> {
        let repo = self.0.repo.lock().await;
        repo.fetch_latest().await.unwrap_or_else(|err| {
            warn!(%err, "failed to read latest history record");
            None
        })
    }

    pub async fn count(&self) -> u64 {
        let repo = self.0.repo.lock().await;
        repo.count().await.unwrap_or_else(|err| {
            warn!(%err, "failed to count history records");
            0
        })
    }

    /// `false` if no record had `id` or the delete failed.
    pub async fn delete_by_id(&self, id: i64) -> bool {
        let repo = self.0.repo.lock().await;
        match repo.delete_by_id(id).await {
            Ok(removed) => {
                if !removed {
                    debug!(id, "no history record with this id");
                }
                removed
            }
            Err(err) => {
                warn!(id, %err, "failed to delete history record");
                false
            }
        }
    }

    pub async fn delete_all(&self) -> bool {
        let repo = self.0.repo.lock().await;
        match repo.delete_all().await {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "failed to clear history");
                false
            }
        }
    }

    /// Write every record to a CSV file in `dir`, in [`fetch_all`] order.
    ///
    /// [`fetch_all`]: Self::fetch_all
    pub async fn export_csv(&self, dir: &Path) -> Option<PathBuf> {
        let records = {
            let repo = self.0.repo.lock().await;
            match repo.fetch_all().await {
                Ok(records) => records,
                Err(err) => {
                    warn!(%err, "failed to read history for export");
                    return None;
                }
            }
        };

        match export::export_csv(&records, dir, self.now()) {
            Ok(path) => {
                debug!(path = %path.display(), records = records.len(), "history exported");
                Some(path)
            }
            Err(err) => {
                warn!(dir = %dir.display(), %err, "failed to write CSV export");
                None
            }
        }
    }
}

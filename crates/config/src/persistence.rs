#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Persistence {
    /// Path to the history database. Unset means history lives in memory.
    pub database_path: Option<PathBuf>,

    /// Directory CSV exports are written to. Defaults to the temp directory.
    pub export_dir: Option<PathBuf>,
}

impl Persistence {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#![forbid(unsafe_code)]

use std::path::PathBuf;

/// Represents all possible errors that can occur in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error occurred while reading the telemetry file.
    #[error("Failed to read telemetry: {0}")]
    ReadFailed(#[from] std::io::Error),

    /// The telemetry file is not valid JSON.
    #[error("Failed to parse telemetry: {0}")]
    ParseFailed(#[from] serde_json::Error),

    /// The telemetry file holds JSON, but not an object at the top level.
    #[error("Telemetry in {0} is not a key/value object")]
    NotAnObject(PathBuf),
}

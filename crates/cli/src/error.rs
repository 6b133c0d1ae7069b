use crate::signals::SignalEvent;
use flume::SendError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to install signal handler: {0}")]
    SignalHandler(#[source] io::Error),

    #[error("Failed to send signal event: {0}")]
    SendSignal(#[from] SendError<SignalEvent>),

    #[error("Failed to open history: {0}")]
    History(#[from] history::Error),

    #[error("Failed to access settings: {0}")]
    Settings(#[from] config::Error),

    #[error("Battery data unavailable")]
    NoTelemetry,
}

//! Error types shared across the crate

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading, validating or persisting interval settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Failures surfaced to callers of the timer handle
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("Timer loop is not running")]
    LoopClosed,

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

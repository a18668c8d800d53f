//! Append-only JSON-lines journal of app starts and state transitions

use std::{
    fmt::Display,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::machine::TransitionContext;

/// One journal line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JournalEntry {
    AppStart {
        timestamp: f64,
    },
    Transition {
        timestamp: f64,
        event: String,
        #[serde(rename = "fromState")]
        from_state: String,
        #[serde(rename = "toState")]
        to_state: String,
    },
}

impl JournalEntry {
    pub fn app_start(at: DateTime<Utc>) -> Self {
        Self::AppStart {
            timestamp: epoch_seconds(at),
        }
    }

    pub fn transition<S: Display, E: Display>(
        context: &TransitionContext<S, E>,
        at: DateTime<Utc>,
    ) -> Self {
        Self::Transition {
            timestamp: epoch_seconds(at),
            event: context.event.to_string(),
            from_state: context.from.to_string(),
            to_state: context.to.to_string(),
        }
    }

    /// Serialize as a single line with keys in sorted order
    pub fn to_line(&self) -> serde_json::Result<String> {
        // Value maps are ordered by key
        serde_json::to_value(self).and_then(|value| serde_json::to_string(&value))
    }
}

fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

/// Journal file appended to one line per entry
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry; failures are logged and swallowed
    pub fn append(&self, entry: &JournalEntry) {
        if let Err(e) = self.try_append(entry) {
            warn!("Failed to write journal entry to {}: {:#}", self.path.display(), e);
        }
    }

    fn try_append(&self, entry: &JournalEntry) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let line = entry.to_line()?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

//! Collaborators the timer drives: tray, sound, notifications and the journal
//!
//! The timer only sees these through traits, so a desktop shell, a test
//! recorder or the logging stand-ins used by the daemon can be plugged in.

pub mod journal;
pub mod notifications;
pub mod sound;
pub mod tray;

use std::sync::Arc;

pub use journal::{Journal, JournalEntry};
pub use notifications::{
    LogNotifier, Notification, NotificationAction, NotificationCategory, Notifier,
};
pub use sound::{Cue, GatedSound, LogSound, SoundPlayer, Volumes};
pub use tray::{IconName, LogTray, TrayIcon};

/// The external sinks handed to a timer at construction
#[derive(Clone)]
pub struct Collaborators {
    pub tray: Arc<dyn TrayIcon>,
    pub sound: Arc<dyn SoundPlayer>,
    pub notifier: Arc<dyn Notifier>,
}

impl Collaborators {
    /// Sinks that only write to the log
    pub fn logging() -> Self {
        Self {
            tray: Arc::new(LogTray),
            sound: Arc::new(LogSound),
            notifier: Arc::new(LogNotifier),
        }
    }
}

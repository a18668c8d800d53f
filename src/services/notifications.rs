//! Desktop notification boundary

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    RestStarted,
    RestFinished,
}

/// Actions a notification can send back to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    SkipRest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
}

impl Notification {
    pub fn rest_started(long: bool) -> Self {
        let body = if long {
            "It's time for a long break!"
        } else {
            "It's time for a short break!"
        };
        Self {
            title: "Time's up".to_string(),
            body: body.to_string(),
            category: NotificationCategory::RestStarted,
        }
    }

    pub fn rest_finished() -> Self {
        Self {
            title: "Break is over".to_string(),
            body: "Keep up the good work!".to_string(),
            category: NotificationCategory::RestFinished,
        }
    }
}

/// Delivers notifications to the user
///
/// Implementations that support actions report them back through
/// `TimerHandle::notification_action`.
pub trait Notifier: Send + Sync {
    fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Notifier stand-in for headless runs
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(
            "Notification [{:?}] {}: {}",
            notification.category, notification.title, notification.body
        );
        Ok(())
    }
}

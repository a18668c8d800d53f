//! Tray icon boundary

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The icons a tray can show for the current interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconName {
    Idle,
    Work,
    ShortRest,
    LongRest,
}

impl IconName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Work => "work",
            Self::ShortRest => "shortrest",
            Self::LongRest => "longrest",
        }
    }
}

impl fmt::Display for IconName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status-area item showing an icon and an optional title next to it
///
/// Errors (a missing icon, say) are logged by the caller and never stop the
/// timer.
pub trait TrayIcon: Send + Sync {
    fn set_icon(&self, icon: IconName) -> anyhow::Result<()>;
    fn set_title(&self, title: Option<&str>) -> anyhow::Result<()>;
}

/// Tray stand-in for headless runs: reports changes to the log
#[derive(Debug, Default)]
pub struct LogTray;

impl TrayIcon for LogTray {
    fn set_icon(&self, icon: IconName) -> anyhow::Result<()> {
        info!("Tray icon: {}", icon);
        Ok(())
    }

    fn set_title(&self, title: Option<&str>) -> anyhow::Result<()> {
        debug!("Tray title: {}", title.unwrap_or("-"));
        Ok(())
    }
}

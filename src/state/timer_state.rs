//! Observable timer snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::PomodoroState;

/// What observers see after every transition and countdown tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: PomodoroState,
    /// Whether a countdown is running
    pub active: bool,
    pub remaining_seconds: Option<u64>,
    /// `MM:SS`, empty while no countdown runs
    pub time_left: String,
    pub finish_time: Option<DateTime<Utc>>,
    pub consecutive_work_intervals: u32,
}

impl TimerSnapshot {
    /// Snapshot of a freshly started, idle timer
    pub fn idle() -> Self {
        Self {
            state: PomodoroState::Idle,
            active: false,
            remaining_seconds: None,
            time_left: String::new(),
            finish_time: None,
            consecutive_work_intervals: 0,
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

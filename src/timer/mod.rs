//! Pomodoro interval controller
//!
//! ```text
//!            start/stop                 timer fired
//!   Idle ───────────────► Work ─────────────────────────► Rest
//!    ▲  ◄─────────────────  │ ▲ ◄── timer fired (continue) ─┘ │
//!    │       start/stop       └──────── skip rest ───────────┘ │
//!    └──────────── start/stop, timer fired (stop after break) ─┘
//! ```
//!
//! Every `workIntervalsInSet` completed work intervals earn a long rest
//! instead of a short one.

mod controller;
mod handlers;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use controller::Timer;
pub use handlers::TimerCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroState {
    Idle,
    Work,
    Rest,
}

impl PomodoroState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Work => "work",
            Self::Rest => "rest",
        }
    }
}

impl fmt::Display for PomodoroState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroEvent {
    StartStop,
    TimerFired,
    SkipRest,
}

impl PomodoroEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartStop => "start_stop",
            Self::TimerFired => "timer_fired",
            Self::SkipRest => "skip_rest",
        }
    }
}

impl fmt::Display for PomodoroEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

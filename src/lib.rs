//! Tomato Bar - a headless Pomodoro interval timer
//!
//! A small state machine alternates between work and rest intervals and
//! drives tray, sound and notification collaborators from its transition
//! handlers. A wall-clock countdown raises the transitions; a local HTTP API
//! stands in for the tray menu.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod machine;
pub mod services;
pub mod settings;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{SettingsError, TimerError};
pub use machine::{StateMachine, StatePattern, TransitionContext};
pub use settings::Settings;
pub use state::AppState;
pub use tasks::{spawn_timer_loop, TimerHandle};
pub use timer::{PomodoroEvent, PomodoroState, Timer};
pub use utils::signals::shutdown_signal;

//! Background tasks module
//!
//! The countdown poller and the loop that owns the timer.

pub mod countdown;
pub mod timer_loop;

// Re-export main types
pub use countdown::{Countdown, CountdownSignal, CountdownSignals};
pub use timer_loop::{run_timer_loop, spawn_timer_loop, Command, TimerHandle};

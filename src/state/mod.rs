//! State management module
//!
//! State shared with the HTTP layer and the snapshot observers receive.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::TimerSnapshot;

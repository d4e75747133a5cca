//! State management module
//!
//! Single-writer ownership of the timer engine plus the channels that carry
//! its snapshots, tick-source run state, and alarm events.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TimerOpError};
pub use timer_state::{AlarmEvent, TickRun, TimerSnapshot};

//! Kitchen Timer - A state-managed HTTP server for a kitchen countdown timer
//!
//! This library provides a single countdown timer with start/pause/resume/
//! reset semantics, overdue tracking past zero, and a one-shot alarm on the
//! zero crossing, exposed over a small HTTP API.

pub mod api;
pub mod config;
pub mod display;
pub mod engine;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{Phase, TimerEngine};
pub use state::AppState;
pub use utils::signals::shutdown_signal;

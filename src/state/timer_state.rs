//! Timer snapshot and channel payload types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::display::{self, Badge};
use crate::engine::{Phase, TimerEngine};

/// Display-ready view of the timer, published after every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_seconds: i64,
    pub display: String,
    pub overdue: Option<String>,
    pub badge: Option<Badge>,
    /// "Running timer for: 1h, 30m" while a countdown is active.
    pub running_for: Option<String>,
}

impl TimerSnapshot {
    /// Derive a snapshot from the current engine state.
    pub fn of(engine: &TimerEngine) -> Self {
        let phase = engine.phase();
        let remaining = engine.remaining_seconds();
        let running_for = match phase {
            Phase::Idle => None,
            Phase::Running | Phase::Paused => Some(format!(
                "Running timer for: {}",
                display::selection_summary(engine.selected_duration())
            )),
        };
        Self {
            phase,
            remaining_seconds: remaining,
            display: display::format_remaining(remaining),
            overdue: display::overdue_text(remaining),
            badge: display::badge(phase, remaining),
            running_for,
        }
    }

    /// Snapshot of a freshly constructed engine.
    pub fn idle() -> Self {
        Self::of(&TimerEngine::new())
    }
}

/// Run state of the tick source, followed by the tick task.
///
/// The epoch advances on every activation or cancellation; a tick carrying a
/// stale epoch is dropped instead of applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRun {
    pub epoch: u64,
    pub active: bool,
}

impl TickRun {
    pub fn inactive() -> Self {
        Self {
            epoch: 0,
            active: false,
        }
    }
}

/// One-shot event emitted when the countdown crosses zero.
#[derive(Debug, Clone)]
pub struct AlarmEvent {
    /// The duration the countdown was started with, for the notification body.
    pub selected_duration: u64,
    pub at: DateTime<Utc>,
}

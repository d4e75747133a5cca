//! Derived display values
//!
//! Pure functions of engine state. Nothing here is stored; the presentation
//! layer recomputes these after every mutation.

use serde::{Deserialize, Serialize};

use crate::engine::Phase;

/// Requested duration as picked by the user, one component per unit.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DurationSelection {
    #[serde(default)]
    pub hours: u64,
    #[serde(default)]
    pub minutes: u64,
    #[serde(default)]
    pub seconds: u64,
}

impl DurationSelection {
    /// Component ranges match the picker: 0..24 hours, 0..60 minutes/seconds.
    pub fn is_valid(&self) -> bool {
        self.hours < 24 && self.minutes < 60 && self.seconds < 60
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

/// Badge color bucket for the selected-tab chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Green,
    Blue,
    Red,
}

/// Tab badge: the highest unit of remaining time with a nonzero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub text: String,
    pub severity: Severity,
}

/// Split the non-negative part of `remaining` into "{h}h : {m}m : {s}s".
pub fn format_remaining(remaining: i64) -> String {
    let n = remaining.max(0);
    let hours = n / 3600;
    let minutes = (n - hours * 3600) / 60;
    let seconds = n - hours * 3600 - minutes * 60;
    format!("{}h : {}m : {}s", hours, minutes, seconds)
}

/// Overdue label, present only once the countdown has passed zero.
pub fn overdue_text(remaining: i64) -> Option<String> {
    if remaining >= 0 {
        return None;
    }
    let overdue = -remaining;
    let unit = if overdue == 1 { "second" } else { "seconds" };
    Some(format!("{} {} overdue", overdue, unit))
}

/// Classify `remaining` for the badge. Absent while idle; once overdue the
/// badge stays pinned at "0 s" (the overdue label carries the excess).
pub fn badge(phase: Phase, remaining: i64) -> Option<Badge> {
    if phase == Phase::Idle {
        return None;
    }
    let n = remaining.max(0);
    let (text, severity) = if n >= 3600 {
        (format!("{} h", n / 3600), Severity::Green)
    } else if n >= 60 {
        (format!("{} m", n / 60), Severity::Blue)
    } else {
        (format!("{} s", n), Severity::Red)
    };
    Some(Badge { text, severity })
}

/// Summary of a selected duration, nonzero units only: "1h, 30m".
pub fn selection_summary(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts: Vec<String> = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 {
        parts.push(format!("{}s", seconds));
    }
    parts.join(", ")
}

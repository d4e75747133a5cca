//! Countdown state machine
//!
//! The engine owns all timer state and transition logic and performs no I/O.
//! Every operation returns the list of effects the caller must carry out
//! (activate or cancel the tick source, sound the alarm, refresh the display),
//! keeping mutation separate from side effects.

use serde::Serialize;
use thiserror::Error;

/// Coarse lifecycle state of the timer, independent of the overdue condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side effect requested by a transition, executed by the engine's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Activate the periodic tick source.
    StartTicks,
    /// Cancel the periodic tick source; no tick may be applied afterwards.
    StopTicks,
    /// One-shot alarm, emitted exactly when the countdown crosses zero.
    SoundAlarm,
    /// Display-relevant state changed; publish a fresh snapshot.
    EmitDisplay,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {op} while {phase}")]
    InvalidTransition { op: &'static str, phase: Phase },
}

/// The single countdown timer.
///
/// `remaining_seconds` is signed on purpose: once the countdown passes zero it
/// keeps decrementing without a floor, so a kitchen timer can show "2 seconds
/// overdue" instead of stopping silently. Overdue is a value condition, not a
/// phase; the engine keeps ticking until paused or reset.
#[derive(Debug)]
pub struct TimerEngine {
    phase: Phase,
    remaining_seconds: i64,
    selected_duration: u64,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            remaining_seconds: 0,
            selected_duration: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.remaining_seconds
    }

    /// Total seconds captured at start time; display only.
    pub fn selected_duration(&self) -> u64 {
        self.selected_duration
    }

    pub fn is_overdue(&self) -> bool {
        self.remaining_seconds < 0
    }

    /// Start a countdown of `duration` seconds.
    ///
    /// Only valid from `Idle`. A zero duration is a benign no-op: the engine
    /// stays idle and returns no effects. Starting while already running or
    /// paused is a caller bug and is rejected.
    pub fn start(&mut self, duration: u64) -> Result<Vec<Effect>, TransitionError> {
        match self.phase {
            Phase::Idle => {
                if duration == 0 {
                    return Ok(Vec::new());
                }
                self.phase = Phase::Running;
                self.selected_duration = duration;
                self.remaining_seconds = duration as i64;
                Ok(vec![Effect::StartTicks, Effect::EmitDisplay])
            }
            phase => Err(TransitionError::InvalidTransition { op: "start", phase }),
        }
    }

    /// Pause the countdown, cancelling the tick source.
    pub fn pause(&mut self) -> Result<Vec<Effect>, TransitionError> {
        match self.phase {
            Phase::Running => {
                self.phase = Phase::Paused;
                Ok(vec![Effect::StopTicks, Effect::EmitDisplay])
            }
            phase => Err(TransitionError::InvalidTransition { op: "pause", phase }),
        }
    }

    /// Resume a paused countdown from exactly the value it was paused at.
    pub fn resume(&mut self) -> Result<Vec<Effect>, TransitionError> {
        match self.phase {
            Phase::Paused => {
                self.phase = Phase::Running;
                Ok(vec![Effect::StartTicks, Effect::EmitDisplay])
            }
            phase => Err(TransitionError::InvalidTransition { op: "resume", phase }),
        }
    }

    /// Return to `Idle`, zeroing all state. Valid from any phase.
    pub fn reset(&mut self) -> Vec<Effect> {
        let was_ticking = self.phase == Phase::Running;
        self.phase = Phase::Idle;
        self.remaining_seconds = 0;
        self.selected_duration = 0;
        if was_ticking {
            vec![Effect::StopTicks, Effect::EmitDisplay]
        } else {
            vec![Effect::EmitDisplay]
        }
    }

    /// Apply one tick of the 1 Hz tick source.
    ///
    /// A tick arriving in any phase other than `Running` is a stray (already
    /// cancelled) tick and is discarded without touching state. The alarm
    /// effect is emitted on the tick that takes `remaining_seconds` from 0 to
    /// -1 and never again, so pausing at zero and resuming later still sounds
    /// the alarm exactly once, on the tick that performs the crossing.
    pub fn tick(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Running {
            return Vec::new();
        }
        self.remaining_seconds -= 1;
        let mut effects = vec![Effect::EmitDisplay];
        if self.remaining_seconds == -1 {
            effects.push(Effect::SoundAlarm);
        }
        effects
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarms(effects: &[Effect]) -> usize {
        effects.iter().filter(|e| **e == Effect::SoundAlarm).count()
    }

    #[test]
    fn start_sets_remaining_and_runs() {
        let mut engine = TimerEngine::new();
        let effects = engine.start(90).unwrap();
        assert_eq!(engine.phase(), Phase::Running);
        assert_eq!(engine.remaining_seconds(), 90);
        assert_eq!(engine.selected_duration(), 90);
        assert!(effects.contains(&Effect::StartTicks));
    }

    #[test]
    fn zero_duration_start_is_a_noop() {
        let mut engine = TimerEngine::new();
        let effects = engine.start(0).unwrap();
        assert!(effects.is_empty());
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.remaining_seconds(), 0);
    }

    #[test]
    fn double_start_is_rejected() {
        let mut engine = TimerEngine::new();
        engine.start(10).unwrap();
        assert_eq!(
            engine.start(5),
            Err(TransitionError::InvalidTransition {
                op: "start",
                phase: Phase::Running,
            })
        );
        // The running countdown is untouched
        assert_eq!(engine.remaining_seconds(), 10);
        assert_eq!(engine.selected_duration(), 10);
    }

    #[test]
    fn ticks_decrement_one_second_each() {
        let mut engine = TimerEngine::new();
        engine.start(5).unwrap();
        for _ in 0..3 {
            engine.tick();
        }
        assert_eq!(engine.remaining_seconds(), 2);
        assert_eq!(engine.phase(), Phase::Running);
    }

    #[test]
    fn alarm_fires_exactly_once_on_zero_crossing() {
        let mut engine = TimerEngine::new();
        engine.start(1).unwrap();

        let first = engine.tick(); // 1 -> 0
        assert_eq!(engine.remaining_seconds(), 0);
        assert_eq!(alarms(&first), 0);

        let second = engine.tick(); // 0 -> -1, crossing
        assert_eq!(engine.remaining_seconds(), -1);
        assert_eq!(alarms(&second), 1);

        let third = engine.tick(); // -1 -> -2, no repeat
        assert_eq!(engine.remaining_seconds(), -2);
        assert_eq!(alarms(&third), 0);
    }

    #[test]
    fn overdue_keeps_counting_without_floor() {
        let mut engine = TimerEngine::new();
        engine.start(1).unwrap();
        for _ in 0..5 {
            engine.tick();
        }
        assert_eq!(engine.remaining_seconds(), -4);
        assert!(engine.is_overdue());
        assert_eq!(engine.phase(), Phase::Running);
    }

    #[test]
    fn pause_and_resume_preserve_remaining_exactly() {
        let mut engine = TimerEngine::new();
        engine.start(10).unwrap();
        engine.tick();
        engine.tick();

        let effects = engine.pause().unwrap();
        assert!(effects.contains(&Effect::StopTicks));
        assert_eq!(engine.phase(), Phase::Paused);
        assert_eq!(engine.remaining_seconds(), 8);

        // Stray ticks while paused are dropped
        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_seconds(), 8);

        let effects = engine.resume().unwrap();
        assert!(effects.contains(&Effect::StartTicks));
        engine.tick();
        assert_eq!(engine.remaining_seconds(), 7);
    }

    #[test]
    fn pause_at_zero_then_resume_still_alarms_on_crossing() {
        let mut engine = TimerEngine::new();
        engine.start(1).unwrap();
        assert_eq!(alarms(&engine.tick()), 0); // 1 -> 0
        engine.pause().unwrap();
        engine.resume().unwrap();
        assert_eq!(alarms(&engine.tick()), 1); // 0 -> -1 after the gap
    }

    #[test]
    fn reset_returns_to_idle_from_any_phase() {
        let mut engine = TimerEngine::new();

        // From Running
        engine.start(30).unwrap();
        engine.tick();
        let effects = engine.reset();
        assert!(effects.contains(&Effect::StopTicks));
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.remaining_seconds(), 0);
        assert_eq!(engine.selected_duration(), 0);

        // From Paused (tick source already stopped)
        engine.start(30).unwrap();
        engine.pause().unwrap();
        let effects = engine.reset();
        assert!(!effects.contains(&Effect::StopTicks));
        assert_eq!(engine.phase(), Phase::Idle);

        // From Idle
        let effects = engine.reset();
        assert!(effects.contains(&Effect::EmitDisplay));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn restart_after_reset_allows_a_fresh_countdown() {
        let mut engine = TimerEngine::new();
        engine.start(2).unwrap();
        for _ in 0..4 {
            engine.tick();
        }
        assert!(engine.is_overdue());
        engine.reset();
        engine.start(3).unwrap();
        assert_eq!(engine.remaining_seconds(), 3);
        assert_eq!(alarms(&engine.tick()), 0);
    }

    #[test]
    fn pause_and_resume_invalid_from_wrong_phases() {
        let mut engine = TimerEngine::new();
        assert_eq!(
            engine.pause(),
            Err(TransitionError::InvalidTransition {
                op: "pause",
                phase: Phase::Idle,
            })
        );
        assert_eq!(
            engine.resume(),
            Err(TransitionError::InvalidTransition {
                op: "resume",
                phase: Phase::Idle,
            })
        );
        engine.start(5).unwrap();
        assert_eq!(
            engine.resume(),
            Err(TransitionError::InvalidTransition {
                op: "resume",
                phase: Phase::Running,
            })
        );
    }
}

//! Main application state management

use std::{sync::Mutex, time::Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::engine::{Effect, TimerEngine, TransitionError};

use super::{AlarmEvent, TickRun, TimerSnapshot};

/// Failure of a timer operation, as surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum TimerOpError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("{0}")]
    Internal(String),
}

/// Engine plus the tick-source epoch, guarded by one lock so ticks and
/// operation calls are linearized.
#[derive(Debug)]
struct TimerCell {
    engine: TimerEngine,
    epoch: u64,
}

/// Main application state owning the timer engine and its channels.
#[derive(Debug)]
pub struct AppState {
    timer: Mutex<TimerCell>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Snapshot published after every mutation
    snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Tick-source run state followed by the tick task
    run_tx: watch::Sender<TickRun>,
    /// One-shot countdown-reached-zero events
    alarm_tx: broadcast::Sender<AlarmEvent>,
    /// Keep the receivers alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
    _run_rx: watch::Receiver<TickRun>,
}

impl AppState {
    /// Create a new AppState with an idle timer
    pub fn new(port: u16, host: String) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerSnapshot::idle());
        let (run_tx, run_rx) = watch::channel(TickRun::inactive());
        let (alarm_tx, _) = broadcast::channel(16);

        Self {
            timer: Mutex::new(TimerCell {
                engine: TimerEngine::new(),
                epoch: 0,
            }),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            snapshot_tx,
            run_tx,
            alarm_tx,
            _snapshot_rx: snapshot_rx,
            _run_rx: run_rx,
        }
    }

    /// Watch the published timer snapshots
    pub fn subscribe_timer(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Watch the tick-source run state
    pub fn subscribe_run(&self) -> watch::Receiver<TickRun> {
        self.run_tx.subscribe()
    }

    /// Listen for countdown-reached-zero events
    pub fn subscribe_alarm(&self) -> broadcast::Receiver<AlarmEvent> {
        self.alarm_tx.subscribe()
    }

    /// Start a countdown of `duration` seconds
    pub fn start_timer(&self, duration: u64) -> Result<TimerSnapshot, TimerOpError> {
        info!("Starting countdown for {} seconds", duration);
        self.with_timer("start", |engine| engine.start(duration))
    }

    /// Pause the running countdown
    pub fn pause_timer(&self) -> Result<TimerSnapshot, TimerOpError> {
        info!("Pausing countdown");
        self.with_timer("pause", |engine| engine.pause())
    }

    /// Resume the paused countdown
    pub fn resume_timer(&self) -> Result<TimerSnapshot, TimerOpError> {
        info!("Resuming countdown");
        self.with_timer("resume", |engine| engine.resume())
    }

    /// Reset the timer back to idle, from any phase
    pub fn reset_timer(&self) -> Result<TimerSnapshot, TimerOpError> {
        info!("Resetting timer");
        self.with_timer("reset", |engine| Ok(engine.reset()))
    }

    /// Apply one tick delivered by the tick task.
    ///
    /// `epoch` is the run-state epoch the tick was scheduled under; a tick
    /// whose epoch no longer matches was cancelled by a pause or reset that
    /// completed after it was already in flight, and is dropped.
    pub fn apply_tick(&self, epoch: u64) -> Result<(), String> {
        let mut cell = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        if epoch != cell.epoch {
            debug!("Dropping stale tick (epoch {}, current {})", epoch, cell.epoch);
            return Ok(());
        }

        let effects = cell.engine.tick();
        self.apply_effects(&mut cell, &effects);
        Ok(())
    }

    /// Get the latest timer snapshot
    pub fn timer_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.timer
            .lock()
            .map(|cell| TimerSnapshot::of(&cell.engine))
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Run a transition under the timer lock and carry out its effects
    fn with_timer<F>(&self, action: &str, op: F) -> Result<TimerSnapshot, TimerOpError>
    where
        F: FnOnce(&mut TimerEngine) -> Result<Vec<Effect>, TransitionError>,
    {
        let mut cell = self
            .timer
            .lock()
            .map_err(|e| TimerOpError::Internal(format!("Failed to lock timer state: {}", e)))?;

        let effects = op(&mut cell.engine)?;
        let snapshot = self.apply_effects(&mut cell, &effects);
        drop(cell);

        self.record_action(action);
        Ok(snapshot)
    }

    /// Execute the effects a transition requested. Channel sends happen under
    /// the timer lock so run-state updates are observed in transition order.
    fn apply_effects(&self, cell: &mut TimerCell, effects: &[Effect]) -> TimerSnapshot {
        let snapshot = TimerSnapshot::of(&cell.engine);

        for effect in effects {
            match effect {
                Effect::StartTicks => {
                    cell.epoch += 1;
                    let run = TickRun {
                        epoch: cell.epoch,
                        active: true,
                    };
                    if self.run_tx.send(run).is_err() {
                        warn!("Failed to send tick-source activation: no receivers");
                    }
                }
                Effect::StopTicks => {
                    cell.epoch += 1;
                    let run = TickRun {
                        epoch: cell.epoch,
                        active: false,
                    };
                    if self.run_tx.send(run).is_err() {
                        warn!("Failed to send tick-source cancellation: no receivers");
                    }
                }
                Effect::SoundAlarm => {
                    let event = AlarmEvent {
                        selected_duration: cell.engine.selected_duration(),
                        at: Utc::now(),
                    };
                    if self.alarm_tx.send(event).is_err() {
                        debug!("No alarm listeners registered");
                    }
                }
                Effect::EmitDisplay => {
                    if self.snapshot_tx.send(snapshot.clone()).is_err() {
                        warn!("Failed to publish timer snapshot: no receivers");
                    }
                }
            }
        }

        snapshot
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Phase;

    fn state() -> AppState {
        AppState::new(0, "127.0.0.1".to_string())
    }

    #[test]
    fn start_activates_tick_source_and_publishes_snapshot() {
        let state = state();
        let run_rx = state.subscribe_run();
        let snapshot_rx = state.subscribe_timer();

        let snapshot = state.start_timer(120).unwrap();
        assert_eq!(snapshot.phase, Phase::Running);
        assert_eq!(snapshot.remaining_seconds, 120);
        assert_eq!(snapshot.badge.as_ref().unwrap().text, "2 m");
        assert_eq!(
            snapshot.running_for.as_deref(),
            Some("Running timer for: 2m")
        );

        let run = *run_rx.borrow();
        assert!(run.active);
        assert_eq!(run.epoch, 1);
        assert_eq!(snapshot_rx.borrow().remaining_seconds, 120);
    }

    #[test]
    fn current_epoch_ticks_apply_and_stale_ticks_drop() {
        let state = state();
        state.start_timer(10).unwrap();

        state.apply_tick(1).unwrap();
        assert_eq!(state.timer_snapshot().unwrap().remaining_seconds, 9);

        // A tick scheduled before the start (epoch 0) must not apply
        state.apply_tick(0).unwrap();
        assert_eq!(state.timer_snapshot().unwrap().remaining_seconds, 9);
    }

    #[test]
    fn pause_invalidates_in_flight_ticks() {
        let state = state();
        let run_rx = state.subscribe_run();
        state.start_timer(10).unwrap();
        state.apply_tick(1).unwrap();

        let snapshot = state.pause_timer().unwrap();
        assert_eq!(snapshot.phase, Phase::Paused);
        let run = *run_rx.borrow();
        assert!(!run.active);
        assert_eq!(run.epoch, 2);

        // A tick that was already in flight under the old epoch is dropped
        state.apply_tick(1).unwrap();
        assert_eq!(state.timer_snapshot().unwrap().remaining_seconds, 9);

        let snapshot = state.resume_timer().unwrap();
        assert_eq!(snapshot.phase, Phase::Running);
        assert!(run_rx.borrow().active);
        assert_eq!(run_rx.borrow().epoch, 3);

        state.apply_tick(3).unwrap();
        assert_eq!(state.timer_snapshot().unwrap().remaining_seconds, 8);
    }

    #[test]
    fn alarm_broadcast_delivered_exactly_once() {
        let state = state();
        let mut alarm_rx = state.subscribe_alarm();
        state.start_timer(1).unwrap();

        state.apply_tick(1).unwrap(); // 1 -> 0
        assert!(alarm_rx.try_recv().is_err());

        state.apply_tick(1).unwrap(); // 0 -> -1, crossing
        let event = alarm_rx.try_recv().unwrap();
        assert_eq!(event.selected_duration, 1);

        state.apply_tick(1).unwrap(); // -1 -> -2
        assert!(alarm_rx.try_recv().is_err());
    }

    #[test]
    fn two_second_countdown_scenario() {
        let state = state();
        state.start_timer(2).unwrap();

        state.apply_tick(1).unwrap();
        assert_eq!(state.timer_snapshot().unwrap().remaining_seconds, 1);

        state.apply_tick(1).unwrap();
        let snapshot = state.timer_snapshot().unwrap();
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.badge.as_ref().unwrap().text, "0 s");
        assert_eq!(snapshot.overdue, None);

        state.apply_tick(1).unwrap();
        let snapshot = state.timer_snapshot().unwrap();
        assert_eq!(snapshot.remaining_seconds, -1);
        assert_eq!(snapshot.overdue.as_deref(), Some("1 second overdue"));
        assert_eq!(snapshot.badge.as_ref().unwrap().text, "0 s");
    }

    #[test]
    fn reset_clears_badge_and_overdue() {
        let state = state();
        let snapshot_rx = state.subscribe_timer();
        state.start_timer(1).unwrap();
        for _ in 0..3 {
            state.apply_tick(1).unwrap();
        }
        assert!(state.timer_snapshot().unwrap().overdue.is_some());

        let snapshot = state.reset_timer().unwrap();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.badge, None);
        assert_eq!(snapshot.overdue, None);
        assert_eq!(snapshot.running_for, None);
        assert_eq!(snapshot_rx.borrow().badge, None);
    }

    #[test]
    fn invalid_transitions_surface_as_errors() {
        let state = state();
        assert!(matches!(
            state.pause_timer(),
            Err(TimerOpError::Transition(_))
        ));

        state.start_timer(5).unwrap();
        assert!(matches!(
            state.start_timer(5),
            Err(TimerOpError::Transition(_))
        ));

        // The failed operation left the countdown untouched
        assert_eq!(state.timer_snapshot().unwrap().remaining_seconds, 5);
    }

    #[test]
    fn zero_duration_start_records_no_activation() {
        let state = state();
        let run_rx = state.subscribe_run();

        let snapshot = state.start_timer(0).unwrap();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(!run_rx.borrow().active);
        assert_eq!(run_rx.borrow().epoch, 0);
    }
}

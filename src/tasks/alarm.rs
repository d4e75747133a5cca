//! Alarm notification background task

use std::sync::Arc;

use notify_rust::Notification;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{
    display::selection_summary,
    state::{AlarmEvent, AppState},
};

/// Background task turning countdown-reached-zero events into desktop
/// notifications. Fire-and-forget: a failed notification is logged, never
/// retried.
pub async fn alarm_task(state: Arc<AppState>) {
    info!("Starting alarm task");

    let mut alarm_rx = state.subscribe_alarm();

    loop {
        match alarm_rx.recv().await {
            Ok(event) => {
                info!("Countdown reached zero at {}, sounding alarm", event.at);
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = show_notification(&event) {
                        warn!("Failed to show alarm notification: {}", e);
                    }
                });
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Alarm listener lagged, {} events missed", missed);
            }
            Err(RecvError::Closed) => {
                info!("Alarm channel closed, stopping alarm task");
                break;
            }
        }
    }
}

fn show_notification(event: &AlarmEvent) -> Result<(), notify_rust::error::Error> {
    Notification::new()
        .summary("Kitchen Timer")
        .body(&format!(
            "Time's up! {} has elapsed.",
            selection_summary(event.selected_duration)
        ))
        .timeout(0) // No auto-dismiss
        .show()?;
    Ok(())
}

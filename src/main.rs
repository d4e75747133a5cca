//! Kitchen Timer - A state-managed HTTP server for a kitchen countdown timer
//!
//! This is the main entry point for the kitchen-timer application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use kitchen_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::{alarm_task, tick_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kitchen_timer={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting kitchen-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}", config.host, config.port);

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone()));

    // Start the tick source background task
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_task(tick_state).await;
    });

    // Start the alarm notification background task
    let alarm_state = Arc::clone(&state);
    tokio::spawn(async move {
        alarm_task(alarm_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start  - Start a countdown ({{hours, minutes, seconds}})");
    info!("  POST /timer/pause  - Pause the running countdown");
    info!("  POST /timer/resume - Resume the paused countdown");
    info!("  POST /timer/reset  - Return the timer to idle");
    info!("  GET  /status       - Current timer snapshot and server info");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

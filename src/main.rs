//! Tomato Bar - a headless Pomodoro interval timer
//!
//! This is the main entry point for the tomato-bar daemon.

use std::sync::Arc;

use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use tomato_bar::{
    api::create_router,
    clock::SystemClock,
    config::Config,
    services::{Collaborators, Journal, JournalEntry},
    settings::{JsonSettingsStore, Settings, SettingsStore},
    state::AppState,
    tasks::spawn_timer_loop,
    timer::Timer,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tomato_bar={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tomato-bar v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(JsonSettingsStore::new(config.settings_path()));
    let settings = store.load().unwrap_or_else(|e| {
        warn!(
            "Failed to load settings from {}: {}, using defaults",
            store.path().display(),
            e
        );
        Settings::default()
    });
    info!(
        "Intervals: work={}min, short rest={}min, long rest={}min, set={}",
        settings.work_interval_length,
        settings.short_rest_interval_length,
        settings.long_rest_interval_length,
        settings.work_intervals_in_set
    );

    let journal = Journal::new(config.journal_path());
    journal.append(&JournalEntry::app_start(Utc::now()));

    let (timer, signals) = Timer::new(
        settings,
        store,
        Collaborators::logging(),
        Arc::new(SystemClock),
    );
    let (timer_handle, timer_task) = spawn_timer_loop(timer.with_journal(journal), signals);

    let state = Arc::new(AppState::new(timer_handle.clone(), config.port, config.host.clone()));
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST  /start-stop          - Start a work interval or stop the timer");
    info!("  POST  /skip-rest           - Skip the current rest");
    info!("  POST  /notification/action - Apply a notification action");
    info!("  GET   /status              - Current state and time left");
    info!("  GET   /settings            - Interval settings");
    info!("  PATCH /settings            - Change interval settings");
    info!("  GET   /health              - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to listen for shutdown signals: {}", e),
            }
        }
    }

    if let Err(e) = timer_handle.shutdown().await {
        warn!("Timer loop already stopped: {}", e);
    }
    if let Err(e) = timer_task.await {
        error!("Timer loop panicked: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

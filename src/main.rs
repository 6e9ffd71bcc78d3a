//! Phase Timer - workout phase countdown and set tracking
//! 
//! This is the main entry point for the phase-timer service.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use phase_timer::{
    api::create_router,
    config::Config,
    services::{JsonPreferenceStore, HapticService, Preferences, TracingHaptics},
    state::AppState,
    tasks::phase_timer_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("phase_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting phase-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, advance_delay={}ms, warning={}s, skip_advances={}",
        config.host, config.port, config.advance_delay_ms, config.warning_seconds, config.skip_advances
    );

    let preferences = match &config.preferences {
        Some(path) => Arc::new(Preferences::new(Arc::new(JsonPreferenceStore::open(path)?))),
        None => {
            info!("No preference file given, keeping preferences in memory");
            Arc::new(Preferences::in_memory())
        }
    };
    let haptics: Arc<dyn HapticService> = Arc::new(TracingHaptics::new(Arc::clone(&preferences)));

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.timer_options(),
        preferences,
        haptics,
    ));

    // Start the phase timer background task
    let timer_state = Arc::clone(&state);
    tokio::spawn(async move {
        phase_timer_task(timer_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /session          - Create a session from activities");
    info!("  POST   /session/plan     - Create a session from a workout plan");
    info!("  DELETE /session          - Dispose the active session");
    info!("  POST   /session/{{start,pause,resume,advance,skip,finish}}");
    info!("  POST   /sets             - Open an exercise for set tracking");
    info!("  GET    /status           - Current timer state");
    info!("  GET    /preferences      - Effective preferences");
    info!("  GET    /health           - Health check");

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

    if let Err(e) = state.dispose_session() {
        tracing::warn!("Failed to dispose session on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

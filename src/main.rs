//! Confirm Gate - timed confirmation gates served over HTTP
//!
//! This is the main entry point for the confirm-gate server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use confirm_gate::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::navigation_log_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("confirm_gate={},tower_http=info", config.log_level()))
        .init();

    info!("Starting confirm-gate server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, countdown={} x {}ms, split={}, max_gates={}",
          config.host, config.port, config.countdown, config.tick_ms, config.confirm_split,
          config.max_gates);
    if config.pointer_leave_confirms {
        info!("Pointer gates start their countdown when the pointer leaves");
    }

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.booking_url.clone(),
        config.gate_settings(),
        config.tick_period(),
        config.max_gates(),
    ));

    // Start the navigation history background task
    let log_state = Arc::clone(&state);
    tokio::spawn(async move {
        navigation_log_task(log_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /gates/pointer             - Mount a pointer gate");
    info!("  POST   /gates/booking             - Mount a booking gate");
    info!("  GET    /gates/:id                 - Gate state");
    info!("  DELETE /gates/:id                 - Unmount a gate");
    info!("  POST   /gates/:id/pointer-move    - Report pointer position");
    info!("  POST   /gates/:id/pointer-leave   - Report pointer leaving");
    info!("  POST   /gates/:id/open|close      - Open or close the dialog");
    info!("  POST   /gates/:id/proceed         - Submit the booking");
    info!("  POST   /gates/:id/redirect-now    - Skip the countdown");
    info!("  PUT    /gates/:id/parent-busy     - Set the parent busy flag");
    info!("  POST   /contact                   - Send a contact request");
    info!("  GET    /inbox | /navigations      - Accepted requests, recent redirects");
    info!("  GET    /status | /health          - Server status, health check");

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

    state.unmount_all();
    info!("Server shutdown complete");
    Ok(())
}

//! Navigation history background task

use std::{sync::Arc, time::Duration};
use tokio::{sync::broadcast::error::RecvError, time::sleep};
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Background task that keeps the most recent navigation requests for
/// `GET /navigations`
pub async fn navigation_log_task(state: Arc<AppState>) {
    info!("Starting navigation log task");

    let mut navigation_rx = state.navigator.subscribe();

    loop {
        match navigation_rx.recv().await {
            Ok(request) => {
                debug!("Recording navigation of gate {} to {}", request.gate_id, request.url);
                if let Err(e) = state.record_navigation(request) {
                    error!("Failed to record navigation: {}", e);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Navigation log lagged, {} requests not recorded", skipped);
            }
            Err(RecvError::Closed) => {
                error!("Navigation channel closed");
                // Wait a bit before giving up on the channel
                sleep(Duration::from_secs(1)).await;
                break;
            }
        }
    }
}

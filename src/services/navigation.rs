//! Navigation sink: where "open this destination" requests go

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// A request to open a destination in a new browsing context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub gate_id: u64,
    pub url: String,
    pub requested_at: DateTime<Utc>,
}

/// Fire-and-forget navigation. Implementations must not block.
pub trait NavigationSink: Send + Sync {
    fn open(&self, gate_id: u64, url: &str);
}

/// Publishes navigation requests to any subscribed client
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: broadcast::Sender<NavigationRequest>,
}

impl ChannelNavigator {
    pub fn new(tx: broadcast::Sender<NavigationRequest>) -> Self {
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigationRequest> {
        self.tx.subscribe()
    }
}

impl NavigationSink for ChannelNavigator {
    fn open(&self, gate_id: u64, url: &str) {
        info!("Gate {} opening {}", gate_id, url);
        let request = NavigationRequest {
            gate_id,
            url: url.to_string(),
            requested_at: Utc::now(),
        };
        if let Err(e) = self.tx.send(request) {
            warn!("No navigation listeners for {}: {}", url, e);
        }
    }
}

//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    gate::ContainerRect,
    services::{ContactRequest, NavigationRequest, StoredRequest},
    tasks::SessionSnapshot,
};

/// Body of `POST /gates/pointer`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePointerGate {
    #[serde(default)]
    pub destination_url: Option<String>,
    #[serde(default)]
    pub container: Option<ContainerRect>,
}

/// Body of `POST /gates/booking`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingGate {
    pub request: ContactRequest,
    #[serde(default)]
    pub destination_url: Option<String>,
    /// Open the dialog right away
    #[serde(default)]
    pub open: bool,
}

/// Body of `POST /gates/:id/pointer-move`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerMoveBody {
    pub client_x: f64,
    #[serde(default)]
    pub container: Option<ContainerRect>,
}

/// Body of `PUT /gates/:id/parent-busy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentBusyBody {
    pub busy: bool,
}

/// Response for every gate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub gate: SessionSnapshot,
}

impl GateResponse {
    /// Create a new gate response
    pub fn new(status: String, message: String, gate: SessionSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            gate,
        }
    }

    /// Create a mounted response
    pub fn mounted(message: String, gate: SessionSnapshot) -> Self {
        Self::new("mounted".to_string(), message, gate)
    }

    /// Create an unmounted response
    pub fn unmounted(message: String, gate: SessionSnapshot) -> Self {
        Self::new("unmounted".to_string(), message, gate)
    }
}

/// Response for `POST /contact`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<StoredRequest>,
}

impl ContactResponse {
    pub fn accepted(request: StoredRequest) -> Self {
        Self {
            status: "accepted".to_string(),
            message: "Thanks, we'll be in touch".to_string(),
            timestamp: Utc::now(),
            request: Some(request),
        }
    }

    pub fn rejected(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
            request: None,
        }
    }
}

/// Response for `GET /navigations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationsResponse {
    pub navigations: Vec<NavigationRequest>,
}

/// Response for `GET /inbox`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxResponse {
    pub requests: Vec<StoredRequest>,
}

/// Server status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub gates: usize,
    pub max_gates: usize,
    pub inbox: usize,
    pub countdown: u32,
    pub tick_ms: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

//! Main application state management

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    gate::{BookingCoordinator, ContainerRect, GateSettings, PointerArbiter},
    services::{ChannelNavigator, ContactRequest, Inbox, InboxSubmit, NavigationRequest, NavigationSink},
    tasks::{GateHandle, GateSession, SessionError},
};

/// How many navigation requests `recent_navigations` keeps
pub const NAVIGATION_HISTORY: usize = 50;

/// Gates mounted at once unless configured otherwise
pub const DEFAULT_MAX_GATES: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("gate limit of {0} reached")]
    LimitReached(usize),
    #[error("{0}")]
    Registry(String),
}

/// Registry of live gates plus the shared services they use
#[derive(Debug)]
pub struct AppState {
    /// Tunables handed to every new gate
    pub settings: GateSettings,
    pub tick_period: Duration,
    /// Upper bound on simultaneously mounted gates
    pub max_gates: usize,
    /// Destination used when a gate is created without one
    pub default_destination: String,
    /// Live gates by id
    gates: Mutex<HashMap<u64, GateHandle>>,
    next_gate_id: AtomicU64,
    /// Accepted contact and booking requests
    pub inbox: Arc<Inbox>,
    pub navigator: ChannelNavigator,
    /// Most recent navigation requests, oldest first
    pub recent_navigations: Mutex<VecDeque<NavigationRequest>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        default_destination: String,
        settings: GateSettings,
        tick_period: Duration,
        max_gates: usize,
    ) -> Self {
        let (navigation_tx, _) = broadcast::channel(100);

        Self {
            settings,
            tick_period,
            max_gates,
            default_destination,
            gates: Mutex::new(HashMap::new()),
            next_gate_id: AtomicU64::new(1),
            inbox: Arc::new(Inbox::new()),
            navigator: ChannelNavigator::new(navigation_tx),
            recent_navigations: Mutex::new(VecDeque::with_capacity(NAVIGATION_HISTORY)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Spawn `session` if there is room for it
    fn register(&self, session: GateSession, action: &str) -> Result<GateHandle, MountError> {
        let mut gates = self.gates.lock()
            .map_err(|e| MountError::Registry(format!("Failed to lock gate registry: {}", e)))?;
        if gates.len() >= self.max_gates {
            warn!("Refusing to mount another gate: {} already live", gates.len());
            return Err(MountError::LimitReached(self.max_gates));
        }
        let handle = session.spawn();
        gates.insert(handle.id(), handle.clone());
        drop(gates);

        self.record_action(action);
        Ok(handle)
    }

    /// Mount a pointer gate whose confirmation opens `destination`
    pub fn create_pointer_gate(
        &self,
        destination: Option<String>,
        container: Option<ContainerRect>,
    ) -> Result<GateHandle, MountError> {
        let id = self.next_gate_id.fetch_add(1, Ordering::Relaxed);
        let destination = destination.unwrap_or_else(|| self.default_destination.clone());
        info!("Mounting pointer gate {} -> {}", id, destination);

        let mut session = GateSession::new(
            id,
            Box::new(PointerArbiter::new(&self.settings)),
            Arc::new(self.navigator.clone()),
            self.tick_period,
        )
        .with_confirm_destination(destination);
        if let Some(rect) = container {
            session = session.with_container(rect);
        }

        self.register(session, "pointer-gate")
    }

    /// Mount a booking gate that submits `request` to the inbox
    pub fn create_booking_gate(
        &self,
        request: ContactRequest,
        destination: Option<String>,
    ) -> Result<GateHandle, MountError> {
        let id = self.next_gate_id.fetch_add(1, Ordering::Relaxed);
        let destination = destination.unwrap_or_else(|| self.default_destination.clone());
        info!("Mounting booking gate {} -> {}", id, destination);

        let session = GateSession::new(
            id,
            Box::new(BookingCoordinator::new(destination, &self.settings)),
            Arc::new(self.navigator.clone()),
            self.tick_period,
        )
        .with_submit(Arc::new(InboxSubmit::new(Arc::clone(&self.inbox), request)));

        self.register(session, "booking-gate")
    }

    /// Look up a live gate
    pub fn gate(&self, id: u64) -> Result<GateHandle, SessionError> {
        let gates = self.gates.lock().map_err(|e| {
            warn!("Failed to lock gate registry: {}", e);
            SessionError::NotFound(id)
        })?;
        gates.get(&id).cloned().ok_or(SessionError::NotFound(id))
    }

    /// Unmount a gate and forget it
    pub fn remove_gate(&self, id: u64) -> Result<GateHandle, SessionError> {
        let handle = {
            let mut gates = self.gates.lock().map_err(|e| {
                warn!("Failed to lock gate registry: {}", e);
                SessionError::NotFound(id)
            })?;
            gates.remove(&id).ok_or(SessionError::NotFound(id))?
        };
        self.record_action("unmount");
        Ok(handle)
    }

    /// Number of gates currently registered
    pub fn gate_count(&self) -> usize {
        self.gates.lock().map(|gates| gates.len()).unwrap_or(0)
    }

    /// Unmount every gate, used on shutdown
    pub fn unmount_all(&self) {
        let handles: Vec<GateHandle> = match self.gates.lock() {
            Ok(mut gates) => gates.drain().map(|(_, handle)| handle).collect(),
            Err(e) => {
                warn!("Failed to lock gate registry: {}", e);
                return;
            }
        };
        for handle in handles {
            if let Err(e) = handle.unmount() {
                warn!("{}", e);
            }
        }
    }

    /// Remember a navigation request, dropping the oldest past the limit
    pub fn record_navigation(&self, request: NavigationRequest) -> Result<(), String> {
        let mut recent = self.recent_navigations.lock()
            .map_err(|e| format!("Failed to lock navigation history: {}", e))?;
        if recent.len() == NAVIGATION_HISTORY {
            recent.pop_front();
        }
        recent.push_back(request);
        Ok(())
    }

    pub fn get_recent_navigations(&self) -> Result<Vec<NavigationRequest>, String> {
        self.recent_navigations.lock()
            .map(|recent| recent.iter().cloned().collect())
            .map_err(|e| format!("Failed to lock navigation history: {}", e))
    }

    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
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

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

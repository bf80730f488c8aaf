//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    services::{ContactRequest, ValidationError},
    state::{AppState, MountError},
    tasks::{SessionCommand, SessionError},
};
use super::responses::{
    ContactResponse, CreateBookingGate, CreatePointerGate, GateResponse, HealthResponse,
    InboxResponse, NavigationsResponse, ParentBusyBody, PointerMoveBody, StatusResponse,
};

type GateResult = Result<Json<GateResponse>, StatusCode>;

fn session_status(e: &SessionError) -> StatusCode {
    match e {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::Unmounted(_) => StatusCode::GONE,
    }
}

fn mount_status(e: &MountError) -> StatusCode {
    match e {
        MountError::LimitReached(_) => StatusCode::SERVICE_UNAVAILABLE,
        MountError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Forward a command to a gate and report the state it produced
async fn forward(state: &AppState, id: u64, command: SessionCommand, message: &str) -> GateResult {
    let handle = state.gate(id).map_err(|e| {
        warn!("{}", e);
        session_status(&e)
    })?;
    match handle.request(command).await {
        Ok(snapshot) => Ok(Json(GateResponse::mounted(message.to_string(), snapshot))),
        Err(e) => {
            warn!("{}", e);
            Err(session_status(&e))
        }
    }
}

/// Handle POST /gates/pointer - Mount a pointer gate
pub async fn create_pointer_gate_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreatePointerGate>>,
) -> GateResult {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    match state.create_pointer_gate(body.destination_url, body.container) {
        Ok(handle) => {
            info!("Pointer gate {} mounted", handle.id());
            Ok(Json(GateResponse::mounted(
                "Pointer gate mounted".to_string(),
                handle.snapshot(),
            )))
        }
        Err(e) => {
            error!("Failed to mount pointer gate: {}", e);
            Err(mount_status(&e))
        }
    }
}

/// Handle POST /gates/booking - Mount a booking gate
pub async fn create_booking_gate_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingGate>,
) -> GateResult {
    let handle = match state.create_booking_gate(body.request, body.destination_url) {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to mount booking gate: {}", e);
            return Err(mount_status(&e));
        }
    };
    info!("Booking gate {} mounted", handle.id());

    if body.open {
        return forward(&state, handle.id(), SessionCommand::SetOpen(true), "Booking gate mounted").await;
    }
    Ok(Json(GateResponse::mounted(
        "Booking gate mounted".to_string(),
        handle.snapshot(),
    )))
}

/// Handle GET /gates/:id - Current gate state
pub async fn gate_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> GateResult {
    match state.gate(id) {
        Ok(handle) => Ok(Json(GateResponse::mounted(
            "Gate state".to_string(),
            handle.snapshot(),
        ))),
        Err(e) => Err(session_status(&e)),
    }
}

/// Handle DELETE /gates/:id - Unmount a gate
pub async fn delete_gate_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> GateResult {
    let handle = state.remove_gate(id).map_err(|e| session_status(&e))?;
    match handle.request(SessionCommand::Unmount).await {
        Ok(snapshot) => {
            info!("Gate {} unmounted", id);
            Ok(Json(GateResponse::unmounted("Gate unmounted".to_string(), snapshot)))
        }
        Err(e) => {
            warn!("Unmounting gate {}: {}", id, e);
            Ok(Json(GateResponse::unmounted(
                "Gate was already unmounted".to_string(),
                handle.snapshot(),
            )))
        }
    }
}

/// Handle POST /gates/:id/pointer-move
pub async fn pointer_move_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<PointerMoveBody>,
) -> GateResult {
    let command = SessionCommand::PointerMove {
        client_x: body.client_x,
        container: body.container,
    };
    forward(&state, id, command, "Pointer moved").await
}

/// Handle POST /gates/:id/pointer-leave
pub async fn pointer_leave_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> GateResult {
    forward(&state, id, SessionCommand::PointerLeave, "Pointer left").await
}

/// Handle POST /gates/:id/open
pub async fn open_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> GateResult {
    forward(&state, id, SessionCommand::SetOpen(true), "Dialog opened").await
}

/// Handle POST /gates/:id/close
pub async fn close_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> GateResult {
    forward(&state, id, SessionCommand::SetOpen(false), "Dialog closed").await
}

/// Handle POST /gates/:id/proceed
pub async fn proceed_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> GateResult {
    state.record_action("proceed");
    forward(&state, id, SessionCommand::Proceed, "Proceed requested").await
}

/// Handle POST /gates/:id/redirect-now
pub async fn redirect_now_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> GateResult {
    state.record_action("redirect-now");
    forward(&state, id, SessionCommand::RedirectNow, "Redirect requested").await
}

/// Handle PUT /gates/:id/parent-busy
pub async fn parent_busy_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<ParentBusyBody>,
) -> GateResult {
    let handle = state.gate(id).map_err(|e| session_status(&e))?;
    handle.set_parent_busy(body.busy);
    Ok(Json(GateResponse::mounted(
        format!("Parent busy set to {}", body.busy),
        handle.snapshot(),
    )))
}

/// Handle POST /contact - Validate and store a contact request
pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContactRequest>,
) -> (StatusCode, Json<ContactResponse>) {
    state.record_action("contact");
    match state.inbox.accept(&request) {
        Ok(stored) => (StatusCode::OK, Json(ContactResponse::accepted(stored))),
        Err(e) => match e.downcast_ref::<ValidationError>() {
            Some(invalid) => (
                StatusCode::BAD_REQUEST,
                Json(ContactResponse::rejected(invalid.to_string())),
            ),
            None => {
                error!("Failed to store contact request: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ContactResponse::rejected("Failed to store request".to_string())),
                )
            }
        },
    }
}

/// Handle GET /inbox
pub async fn inbox_handler(State(state): State<Arc<AppState>>) -> Result<Json<InboxResponse>, StatusCode> {
    match state.inbox.list() {
        Ok(requests) => Ok(Json(InboxResponse { requests })),
        Err(e) => {
            error!("Failed to list inbox: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /navigations
pub async fn navigations_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NavigationsResponse>, StatusCode> {
    match state.get_recent_navigations() {
        Ok(navigations) => Ok(Json(NavigationsResponse { navigations })),
        Err(e) => {
            error!("Failed to read navigation history: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let inbox = match state.inbox.list() {
        Ok(requests) => requests.len(),
        Err(e) => {
            error!("Failed to read inbox: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        gates: state.gate_count(),
        max_gates: state.max_gates,
        inbox,
        countdown: state.settings.countdown,
        tick_ms: state.tick_period.as_millis() as u64,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

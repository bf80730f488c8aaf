use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::time::sleep;
use tower::ServiceExt;

use confirm_gate::{
    create_router, state::DEFAULT_MAX_GATES, tasks::navigation_log_task, AppState, GateSettings,
};

const BOOKING_URL: &str = "https://calendly.com/studio/intro";

fn app() -> (Router, Arc<AppState>) {
    app_with_limit(DEFAULT_MAX_GATES)
}

fn app_with_limit(max_gates: usize) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        BOOKING_URL.to_string(),
        GateSettings::default(),
        Duration::from_secs(1),
        max_gates,
    ));
    tokio::spawn(navigation_log_task(Arc::clone(&state)));
    (create_router(Arc::clone(&state)), state)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn booking_body(email: &str) -> Value {
    json!({
        "request": {
            "name": "Ada",
            "email": email,
            "message": "We'd like a new website",
            "service": "Web Design"
        },
        "open": true
    })
}

#[tokio::test(start_paused = true)]
async fn health_and_status() {
    let (app, _) = app();

    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gates"], 0);
    assert_eq!(body["countdown"], 3);
    assert_eq!(body["tick_ms"], 1000);
}

#[tokio::test(start_paused = true)]
async fn booking_gate_redirects_after_countdown() {
    let (app, state) = app();

    let (status, body) = call(&app, Method::POST, "/gates/booking", Some(booking_body("ada@example.com"))).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["gate"]["id"].as_u64().unwrap();
    assert_eq!(body["gate"]["gate"]["variant"], "booking");
    assert_eq!(body["gate"]["gate"]["open"], true);
    assert_eq!(body["gate"]["gate"]["footer"]["kind"], "actions");

    let (status, body) = call(&app, Method::POST, &format!("/gates/{}/proceed", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gate"]["gate"]["footer"]["kind"], "submitting");

    sleep(Duration::from_millis(500)).await;
    let (_, body) = call(&app, Method::GET, &format!("/gates/{}", id), None).await;
    assert_eq!(body["gate"]["gate"]["countdown"], 3);
    assert_eq!(body["gate"]["gate"]["footer"]["kind"], "counting_down");
    assert!(body["gate"]["gate"]["redirect_message"].is_string());
    assert_eq!(state.inbox.list().unwrap().len(), 1);

    sleep(Duration::from_secs(3)).await;
    let (_, body) = call(&app, Method::GET, &format!("/gates/{}", id), None).await;
    assert_eq!(body["gate"]["navigations"], 1);
    assert_eq!(body["gate"]["close_signals"], 1);
    assert_eq!(body["gate"]["gate"]["open"], false);

    let (_, body) = call(&app, Method::GET, "/navigations", None).await;
    let navigations = body["navigations"].as_array().unwrap();
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0]["url"], BOOKING_URL);
    assert_eq!(navigations[0]["gate_id"], id);
}

#[tokio::test(start_paused = true)]
async fn redirect_now_skips_the_wait() {
    let (app, _) = app();
    let (_, body) = call(&app, Method::POST, "/gates/booking", Some(booking_body("ada@example.com"))).await;
    let id = body["gate"]["id"].as_u64().unwrap();

    call(&app, Method::POST, &format!("/gates/{}/proceed", id), None).await;
    sleep(Duration::from_millis(1_500)).await;

    let (status, body) = call(&app, Method::POST, &format!("/gates/{}/redirect-now", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gate"]["navigations"], 1);
    assert_eq!(body["gate"]["gate"]["timer_running"], false);

    sleep(Duration::from_secs(5)).await;
    let (_, body) = call(&app, Method::GET, &format!("/gates/{}", id), None).await;
    assert_eq!(body["gate"]["navigations"], 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_booking_returns_to_actions() {
    let (app, state) = app();
    let (_, body) = call(&app, Method::POST, "/gates/booking", Some(booking_body("not-an-email"))).await;
    let id = body["gate"]["id"].as_u64().unwrap();

    call(&app, Method::POST, &format!("/gates/{}/proceed", id), None).await;
    sleep(Duration::from_secs(5)).await;

    let (_, body) = call(&app, Method::GET, &format!("/gates/{}", id), None).await;
    let gate = &body["gate"]["gate"];
    assert_eq!(gate["submitting"], false);
    assert_eq!(gate["timer_running"], false);
    assert_eq!(gate["footer"]["kind"], "actions");
    assert!(gate.get("submit_error").is_none());
    assert_eq!(body["gate"]["navigations"], 0);
    assert!(state.inbox.list().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn parent_busy_blocks_proceed() {
    let (app, _) = app();
    let (_, body) = call(&app, Method::POST, "/gates/booking", Some(booking_body("ada@example.com"))).await;
    let id = body["gate"]["id"].as_u64().unwrap();

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/gates/{}/parent-busy", id),
        Some(json!({ "busy": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::POST, &format!("/gates/{}/proceed", id), None).await;
    assert_eq!(body["gate"]["gate"]["submitting"], false);
    assert_eq!(body["gate"]["gate"]["footer"]["kind"], "actions");
}

#[tokio::test(start_paused = true)]
async fn pointer_gate_follows_regions() {
    let (app, _) = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/gates/pointer",
        Some(json!({ "container": { "left": 0.0, "top": 0.0, "width": 500.0, "height": 60.0 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["gate"]["id"].as_u64().unwrap();
    assert_eq!(body["gate"]["gate"]["region"], "none");

    let uri = format!("/gates/{}/pointer-move", id);
    let (_, body) = call(&app, Method::POST, &uri, Some(json!({ "client_x": 400.0 }))).await;
    assert_eq!(body["gate"]["gate"]["region"], "right");
    assert_eq!(body["gate"]["gate"]["footer"]["kind"], "counting_down");
    assert_eq!(body["gate"]["gate"]["footer"]["remaining"], 3);

    let (_, body) = call(&app, Method::POST, &uri, Some(json!({ "client_x": 40.0 }))).await;
    assert_eq!(body["gate"]["gate"]["region"], "left");
    assert_eq!(body["gate"]["gate"]["timer_running"], false);

    let (_, body) = call(&app, Method::POST, &format!("/gates/{}/pointer-leave", id), None).await;
    assert_eq!(body["gate"]["gate"]["region"], "none");
    assert_eq!(body["gate"]["gate"]["timer_running"], true);

    sleep(Duration::from_millis(3_500)).await;
    let (_, body) = call(&app, Method::GET, &format!("/gates/{}", id), None).await;
    assert_eq!(body["gate"]["gate"]["confirmations"], 1);
    assert_eq!(body["gate"]["navigations"], 1);

    let (_, body) = call(&app, Method::GET, "/navigations", None).await;
    assert_eq!(body["navigations"][0]["url"], BOOKING_URL);
}

#[tokio::test(start_paused = true)]
async fn closing_mid_submit_cancels_the_redirect() {
    let (app, _) = app();
    let (_, body) = call(&app, Method::POST, "/gates/booking", Some(booking_body("ada@example.com"))).await;
    let id = body["gate"]["id"].as_u64().unwrap();

    let (_, body) = call(&app, Method::POST, &format!("/gates/{}/proceed", id), None).await;
    assert_eq!(body["gate"]["gate"]["submitting"], true);
    let (_, body) = call(&app, Method::POST, &format!("/gates/{}/close", id), None).await;
    assert_eq!(body["gate"]["gate"]["open"], false);
    assert_eq!(body["gate"]["gate"]["submitting"], false);

    sleep(Duration::from_secs(5)).await;
    let (_, body) = call(&app, Method::GET, &format!("/gates/{}", id), None).await;
    assert_eq!(body["gate"]["navigations"], 0);
    assert_eq!(body["gate"]["gate"]["timer_running"], false);

    let (_, body) = call(&app, Method::GET, "/navigations", None).await;
    assert!(body["navigations"].as_array().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn gate_limit_returns_service_unavailable() {
    let (app, _) = app_with_limit(2);
    for _ in 0..2 {
        let (status, _) = call(&app, Method::POST, "/gates/pointer", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = call(&app, Method::POST, "/gates/pointer", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _) = call(&app, Method::POST, "/gates/booking", Some(booking_body("ada@example.com"))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (_, body) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(body["gates"], 2);
    assert_eq!(body["max_gates"], 2);

    call(&app, Method::DELETE, "/gates/1", None).await;
    let (status, _) = call(&app, Method::POST, "/gates/pointer", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn unknown_and_unmounted_gates() {
    let (app, _) = app();
    let (status, _) = call(&app, Method::GET, "/gates/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(&app, Method::POST, "/gates/pointer", None).await;
    let id = body["gate"]["id"].as_u64().unwrap();

    let (status, body) = call(&app, Method::DELETE, &format!("/gates/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unmounted");
    assert_eq!(body["gate"]["mounted"], false);

    let (status, _) = call(&app, Method::POST, &format!("/gates/{}/pointer-leave", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn contact_validation() {
    let (app, _) = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/contact",
        Some(json!({ "name": "Ada", "email": "ada@", "message": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, body) = call(
        &app,
        Method::POST,
        "/contact",
        Some(json!({ "name": "Ada", "email": "ada@example.com", "message": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["id"], 1);

    let (_, body) = call(&app, Method::GET, "/inbox", None).await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);
}

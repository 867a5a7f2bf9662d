//! HTTP surface of the relay.
//!
//! Three routes: a root liveness probe for the hosting platform, the
//! provider's GET verification handshake, and the POST webhook itself.
//! The webhook answers 200 to every delivery regardless of what happens
//! inside; a non-200 would make the provider retry or disable the hook.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use recepta_core::{config::ApiConfig, error::RelayError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::gateway::{Gateway, Outcome};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    gateway: Arc<Gateway>,
    verify_token: String,
}

/// Query parameters of the webhook verification handshake.
#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// Constant-time string comparison to prevent timing attacks on token
/// validation.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// `GET /` — liveness probe.
async fn root() -> &'static str {
    "Recepta relay is running."
}

/// `GET /webhook` — subscription verification handshake.
///
/// Echoes the challenge back when the mode is `subscribe` and the token
/// matches. An empty configured token rejects everything rather than
/// matching an empty query token.
async fn verify(
    State(state): State<ApiState>,
    Query(params): Query<VerifyParams>,
) -> Result<String, (StatusCode, Json<Value>)> {
    let forbidden = || {
        (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "verification failed"})),
        )
    };

    if params.mode.as_deref() != Some("subscribe") {
        return Err(forbidden());
    }
    if state.verify_token.is_empty() {
        warn!("webhook verification attempted with no verify token configured");
        return Err(forbidden());
    }
    match (&params.verify_token, &params.challenge) {
        (Some(token), Some(challenge)) if constant_time_eq(token, &state.verify_token) => {
            info!("webhook verification succeeded");
            Ok(challenge.clone())
        }
        _ => Err(forbidden()),
    }
}

/// `POST /webhook` — inbound message delivery.
///
/// Always answers 200. A malformed body is processed as null and ends up
/// ignored; a panic inside the pipeline is caught at the spawn boundary
/// and reported as `status: error`, still with 200.
async fn webhook(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Json<Value> {
    let payload = match body {
        Ok(Json(value)) => value,
        Err(e) => {
            warn!("webhook body was not valid JSON: {e}");
            Value::Null
        }
    };

    let gateway = state.gateway.clone();
    let handled = tokio::spawn(async move { gateway.handle_inbound(&payload).await }).await;

    match handled {
        Ok(Outcome::Ok) => Json(json!({"status": "ok"})),
        Ok(Outcome::Ignored(reason)) => Json(json!({"status": "ignored", "reason": reason})),
        Err(e) => {
            error!("webhook pipeline panicked: {e}");
            Json(json!({"status": "error"}))
        }
    }
}

/// Build the axum router with shared state.
fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/webhook", get(verify).post(webhook))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Bind and run the HTTP server until the process exits.
pub async fn serve(config: &ApiConfig, gateway: Arc<Gateway>) -> Result<(), RelayError> {
    let state = ApiState {
        gateway,
        verify_token: config.verify_token.clone(),
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(RelayError::Io)?;

    info!("relay listening on {addr}");

    axum::serve(listener, app).await.map_err(RelayError::Io)
}

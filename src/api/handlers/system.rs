//! System endpoints: usage info and health.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{ActiveConnectionDto, HealthResponse, InfoResponse, UsageInfo};
use crate::app_state::AppState;

/// `GET /` — Usage guidance.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Usage guidance",
    description = "Returns the webhook and WebSocket URL patterns for this relay.",
    responses(
        (status = 200, description = "Usage guidance", body = InfoResponse),
    )
)]
pub async fn info_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| state.config.listen_addr.to_string(), str::to_string);
    let (http, ws) = if forwarded_https(&headers) {
        ("https", "wss")
    } else {
        ("http", "ws")
    };

    (
        StatusCode::OK,
        Json(InfoResponse {
            service: state.config.service_name.clone(),
            usage: UsageInfo {
                webhook: format!("{http}://{host}/webhook/:id"),
                websocket: format!("{ws}://{host}/ws?id=:id"),
                description: "Connect your app's WebSocket to /ws?id=YOUR_ID and use \
                              /webhook/YOUR_ID as the webhook URL"
                    .to_string(),
            },
        }),
    )
}

/// `true` when a proxy reports the client connected over TLS. Only the
/// first hop of `X-Forwarded-Proto` counts.
fn forwarded_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// `GET /health` — Service health and live subscriptions.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service status plus every identifier with live subscribers and their count.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let active_connections = state
        .relay_service
        .registry()
        .entries()
        .await
        .into_iter()
        .map(ActiveConnectionDto::from)
        .collect();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_connections,
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(info_handler))
        .route("/health", get(health_handler))
}

//! Webhook ingestion handler.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use crate::app_state::AppState;
use crate::domain::{WebhookEvent, WebhookId};
use crate::error::{ErrorResponse, RelayError};

/// Plain-text acknowledgment returned for every accepted webhook.
pub const WEBHOOK_ACK: &str = "Webhook received successfully";

/// `POST /webhook/{id}` — Relay a webhook to subscribers of `id`.
///
/// The acknowledgment is the same whether or not anyone is listening.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] if the body is declared as JSON
/// but does not parse.
#[utoipa::path(
    post,
    path = "/webhook/{id}",
    tag = "Webhooks",
    summary = "Relay a webhook",
    description = "Forwards the body and correlation headers to every WebSocket currently subscribed to `id`. Nothing is stored for later subscribers.",
    params(
        ("id" = String, Path, description = "Opaque webhook identifier"),
        ("aq-event-type" = Option<String>, Header, description = "Event-type label"),
        ("aq-activity-job-id" = Option<String>, Header, description = "Activity job identifier"),
        ("aq-reference-id" = Option<String>, Header, description = "Reference identifier"),
        ("aq-instructions" = Option<String>, Header, description = "Sender instructions"),
    ),
    request_body(content = String, description = "Arbitrary payload, forwarded verbatim"),
    responses(
        (status = 200, description = "Webhook accepted", body = String, content_type = "text/plain"),
        (status = 400, description = "Body declared as JSON is malformed", body = ErrorResponse),
    )
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, RelayError> {
    let event = WebhookEvent::from_request(WebhookId::new(id), &headers, &body)?;
    tracing::info!(
        webhook_id = %event.webhook_id,
        event_type = event.event_type.as_deref().unwrap_or_default(),
        "webhook received"
    );

    let report = state.relay_service.deliver(&event).await?;
    tracing::debug!(webhook_id = %event.webhook_id, ?report, "delivery finished");

    Ok((StatusCode::OK, WEBHOOK_ACK))
}

/// Webhook routes, with the request body capped at `max_body_bytes`.
pub fn routes(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/webhook/{id}", post(receive_webhook))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

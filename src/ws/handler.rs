//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{Query, State};
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::WebhookId;

/// Picks the subscription identifier out of the query pairs.
///
/// Only the first `id` is considered, so `?id=a&id=b` subscribes to `a`
/// and `?id=&id=b` is rejected like a missing id.
fn subscription_id(params: &[(String, String)]) -> Option<WebhookId> {
    let first = params
        .iter()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.as_str());
    WebhookId::from_query(first)
}

/// `GET /ws?id={id}` — Upgrade to a WebSocket subscribed to `id`.
///
/// Without a non-empty `id` the upgrade is still accepted, but the socket
/// is closed straight away and never registered.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<Vec<(String, String)>>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let Some(webhook_id) = subscription_id(&params) else {
        tracing::info!("ws client connected without webhook id, closing");
        return ws.on_upgrade(reject_connection);
    };

    let relay = Arc::clone(&state.relay_service);
    ws.on_upgrade(move |socket| run_connection(socket, webhook_id, relay))
}

/// Closes a socket that never reached the `Open` state.
async fn reject_connection(mut socket: WebSocket) {
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: Utf8Bytes::from_static("missing id query parameter"),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %e, "close frame not delivered");
    }
}

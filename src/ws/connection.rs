//! WebSocket connection read/write loop.
//!
//! Each subscriber connection is registered on entry and unregistered on
//! exit, whichever side ends it. Frames queued by the relay are written in
//! order; anything the client sends is ignored except for close.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::domain::WebhookId;
use crate::service::RelayService;

/// Runs the read/write loop for a single subscriber connection.
///
/// - Registers the subscriber under `webhook_id`.
/// - Writes every frame from the subscriber's outbound queue to the socket.
/// - Stops on a client close, a socket error, or when the relay closes
///   the subscriber, then unregisters it.
pub async fn run_connection(socket: WebSocket, webhook_id: WebhookId, relay: Arc<RelayService>) {
    let (handle, mut outbound) = relay.connect(webhook_id).await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Frame queued by a webhook delivery
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    // Closed by the relay after a failed delivery
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                };
                if let Err(e) = ws_tx.send(Message::text(String::from(&*frame))).await {
                    tracing::debug!(subscriber_id = %handle.id(), error = %e, "ws write failed");
                    break;
                }
            }
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(subscriber_id = %handle.id(), error = %e, "ws read failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    relay.disconnect(&handle).await;
    tracing::debug!(subscriber_id = %handle.id(), "ws connection closed");
}

//! Response bodies for the informational and health endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::EntrySummary;

/// `GET /` response: how to use the relay.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InfoResponse {
    /// Service name.
    pub service: String,
    /// URL patterns for both sides of the relay.
    pub usage: UsageInfo,
}

/// URL patterns reported by `GET /`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsageInfo {
    /// Where the sender posts webhooks.
    pub webhook: String,
    /// Where subscribers open their WebSocket.
    pub websocket: String,
    /// Short human-readable instructions.
    pub description: String,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status; always `"ok"` while the process serves requests.
    pub status: String,
    /// RFC 3339 time the report was generated.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Every identifier with at least one live subscriber.
    pub active_connections: Vec<ActiveConnectionDto>,
}

/// One registry entry as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveConnectionDto {
    /// Identifier subscribers are listening on.
    pub webhook_id: String,
    /// Number of live subscribers for it.
    pub connections: usize,
}

impl From<EntrySummary> for ActiveConnectionDto {
    fn from(entry: EntrySummary) -> Self {
        Self {
            webhook_id: entry.webhook_id.as_str().to_string(),
            connections: entry.connections,
        }
    }
}

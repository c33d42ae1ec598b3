//! Webhook events and the payload relayed to subscribers.
//!
//! A [`WebhookEvent`] is built from one inbound `POST /webhook/{id}`
//! request, serialized once into a [`Frame`], and dropped as soon as every
//! subscriber in the snapshot has been attempted. Nothing is retained.

use std::sync::Arc;

use axum::http::HeaderMap;
use serde::Serialize;

use super::WebhookId;
use super::subscriber::Frame;
use crate::error::RelayError;

/// Header carrying the event-type label.
pub const EVENT_TYPE_HEADER: &str = "aq-event-type";
/// Header carrying the sender's activity job identifier.
pub const ACTIVITY_JOB_ID_HEADER: &str = "aq-activity-job-id";
/// Header carrying the sender's reference identifier.
pub const REFERENCE_ID_HEADER: &str = "aq-reference-id";
/// Header carrying free-form instructions from the sender.
pub const INSTRUCTIONS_HEADER: &str = "aq-instructions";

/// Fixed set of sender headers forwarded into every payload.
///
/// Absent headers are omitted from the serialized block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrelationHeaders {
    /// Value of `aq-event-type`.
    #[serde(rename = "aq-event-type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Value of `aq-activity-job-id`.
    #[serde(rename = "aq-activity-job-id", skip_serializing_if = "Option::is_none")]
    pub activity_job_id: Option<String>,
    /// Value of `aq-reference-id`.
    #[serde(rename = "aq-reference-id", skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    /// Value of `aq-instructions`.
    #[serde(rename = "aq-instructions", skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl CorrelationHeaders {
    /// Extracts the correlation headers from an inbound request.
    ///
    /// Non-UTF-8 header bytes are decoded lossily.
    #[must_use]
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        };
        Self {
            event_type: get(EVENT_TYPE_HEADER),
            activity_job_id: get(ACTIVITY_JOB_ID_HEADER),
            reference_id: get(REFERENCE_ID_HEADER),
            instructions: get(INSTRUCTIONS_HEADER),
        }
    }
}

/// One webhook, as pushed to subscribers.
///
/// Serializes to
/// `{"id": …, "eventType": …, "content": …, "headers": {…}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEvent {
    /// Identifier taken from the webhook URL.
    #[serde(rename = "id")]
    pub webhook_id: WebhookId,
    /// Event-type label, mirrored from the `aq-event-type` header.
    #[serde(rename = "eventType", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Request body.
    pub content: serde_json::Value,
    /// Forwarded correlation headers.
    pub headers: CorrelationHeaders,
}

impl WebhookEvent {
    /// Builds an event from the raw parts of a webhook request.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRequest`] if the body is declared as
    /// JSON but does not parse.
    pub fn from_request(
        webhook_id: WebhookId,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Self, RelayError> {
        let content_type = headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let content = decode_body(content_type, body)?;
        let headers = CorrelationHeaders::from_header_map(headers);
        Ok(Self {
            webhook_id,
            event_type: headers.event_type.clone(),
            content,
            headers,
        })
    }

    /// Serializes the event once into a shareable frame.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialization`] if JSON encoding fails.
    pub fn to_frame(&self) -> Result<Frame, RelayError> {
        let json = serde_json::to_string(self)?;
        Ok(Arc::from(json))
    }
}

/// Interprets a webhook body.
///
/// - empty body, or no content type at all → `{}`
/// - JSON content type → parsed JSON value
/// - any other content type → the body as a JSON string
fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<serde_json::Value, RelayError> {
    let Some(content_type) = content_type else {
        return Ok(empty_object());
    };
    if body.is_empty() {
        return Ok(empty_object());
    }
    if is_json_content_type(content_type) {
        return serde_json::from_slice(body)
            .map_err(|e| RelayError::InvalidRequest(format!("malformed JSON body: {e}")));
    }
    Ok(serde_json::Value::String(
        String::from_utf8_lossy(body).into_owned(),
    ))
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

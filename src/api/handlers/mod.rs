//! HTTP endpoint handlers organized by resource.

pub mod system;
pub mod webhook;

use axum::Router;

use crate::app_state::AppState;

/// Composes all HTTP routes.
pub fn routes(max_webhook_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(webhook::routes(max_webhook_body_bytes))
        .merge(system::routes())
}

//! WebSocket layer: subscription upgrade and per-connection delivery.
//!
//! The endpoint at `/ws?id={id}` is push-only: the server writes one JSON
//! text message per relayed webhook.

pub mod connection;
pub mod handler;

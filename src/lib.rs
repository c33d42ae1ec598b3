//! # webhook-relay
//!
//! Relays inbound webhooks to live WebSocket subscribers.
//!
//! A client that cannot receive HTTP callbacks opens a WebSocket at
//! `/ws?id={id}` and hands `/webhook/{id}` to the webhook sender. Every
//! webhook posted there is pushed, as JSON, to each socket subscribed to
//! the same identifier at that moment. Nothing is stored: a webhook with no
//! listener is acknowledged and dropped.
//!
//! ## Architecture
//!
//! ```text
//! Webhook sender (HTTP)          Subscribers (WebSocket)
//!     │                               │
//!     ├── REST Handlers (api/)        ├── WS Handler (ws/)
//!     │                               │
//!     └──────── RelayService (service/) ┘
//!                     │
//!             SubscriberRegistry (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

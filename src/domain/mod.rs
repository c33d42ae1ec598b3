//! Domain layer: identifiers, subscriber handles, the subscriber registry
//! and webhook events.
//!
//! This module holds the relay's only shared mutable state, the
//! [`SubscriberRegistry`], along with the types flowing through it.

pub mod subscriber;
pub mod subscriber_registry;
pub mod webhook_event;
pub mod webhook_id;

pub use subscriber::{ConnectionState, Frame, SendOutcome, SubscriberHandle, SubscriberId};
pub use subscriber_registry::{EntrySummary, SubscriberRegistry};
pub use webhook_event::{CorrelationHeaders, WebhookEvent};
pub use webhook_id::WebhookId;

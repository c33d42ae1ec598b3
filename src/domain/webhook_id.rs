//! Opaque webhook identifier.
//!
//! [`WebhookId`] is the sole correlation key between a subscriber
//! connection and the webhooks it should receive. No format is enforced:
//! any string supplied by the client or the sender is accepted and compared
//! by exact match.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier linking a subscriber connection to the webhooks it receives.
///
/// Used as the dictionary key in [`super::SubscriberRegistry`] and echoed
/// back as the `id` field of every relayed payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookId(String);

impl WebhookId {
    /// Wraps a raw identifier string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parses an identifier supplied on a subscription request.
    ///
    /// Returns `None` when the value is absent or empty, which is the only
    /// rejection a subscription ever receives.
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Option<Self> {
        raw.filter(|s| !s.is_empty()).map(Self::new)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WebhookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WebhookId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl Borrow<str> for WebhookId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

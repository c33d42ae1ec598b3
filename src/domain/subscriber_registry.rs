//! Concurrent identifier → subscriber-set storage.
//!
//! [`SubscriberRegistry`] is the single source of truth for "who should
//! receive events for this identifier". All operations go through one
//! [`tokio::sync::Mutex`]; every critical section is a map lookup plus, for
//! broadcasts, a handful of non-blocking queue pushes, so the guard stays
//! cheap even under connection churn.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use super::subscriber::{Frame, SendOutcome, SubscriberHandle};
use super::WebhookId;

/// Identifier and live subscriber count, as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    /// Identifier the subscribers listen on.
    pub webhook_id: WebhookId,
    /// Number of subscribers currently registered under it.
    pub connections: usize,
}

/// In-memory registry of live subscribers keyed by [`WebhookId`].
///
/// # Invariants
///
/// - An identifier is present in the map iff at least one handle is
///   registered under it. Removing the last handle prunes the entry.
/// - Handles keep their registration order.
/// - Registering the same handle twice is not rejected and leads to
///   duplicate delivery; avoiding it is the caller's job.
///
/// # Concurrency
///
/// Register, unregister, snapshot and broadcast are mutually exclusive.
/// A broadcast sends to every member of its snapshot before releasing the
/// guard, so two events for the same identifier reach every subscriber in
/// the same relative order.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    entries: Mutex<HashMap<WebhookId, Vec<Arc<SubscriberHandle>>>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handle` under its identifier, creating the entry if absent.
    ///
    /// Returns the number of subscribers registered under that identifier
    /// after the insertion.
    pub async fn register(&self, handle: Arc<SubscriberHandle>) -> usize {
        let mut map = self.entries.lock().await;
        let members = map.entry(handle.webhook_id().clone()).or_default();
        members.push(handle);
        members.len()
    }

    /// Removes `handle` from its identifier's entry.
    ///
    /// Absent entries and absent handles are a no-op. When the last member
    /// leaves, the entry is removed. Returns `true` if a handle was removed.
    pub async fn unregister(&self, handle: &SubscriberHandle) -> bool {
        let mut map = self.entries.lock().await;
        let Some(members) = map.get_mut(handle.webhook_id()) else {
            return false;
        };
        let Some(pos) = members.iter().position(|h| h.id() == handle.id()) else {
            return false;
        };
        members.remove(pos);
        if members.is_empty() {
            map.remove(handle.webhook_id());
        }
        true
    }

    /// Returns the handles currently registered under `webhook_id`, or an
    /// empty vector for an unknown identifier.
    ///
    /// The result is an owned copy; iterating it does not hold the guard.
    /// Webhook delivery does not go through here: it uses
    /// [`broadcast`](Self::broadcast), which snapshots and sends under one
    /// guard so that fan-outs for the same identifier never interleave.
    pub async fn snapshot(&self, webhook_id: &str) -> Vec<Arc<SubscriberHandle>> {
        let map = self.entries.lock().await;
        map.get(webhook_id).cloned().unwrap_or_default()
    }

    /// Takes a snapshot for `webhook_id` and attempts one send of `frame`
    /// to each member, all under the guard.
    ///
    /// Returns every snapshot member paired with its outcome, in
    /// registration order. Failed handles are left registered; removing
    /// them is up to the caller.
    pub async fn broadcast(
        &self,
        webhook_id: &str,
        frame: &Frame,
    ) -> Vec<(Arc<SubscriberHandle>, SendOutcome)> {
        let map = self.entries.lock().await;
        let Some(members) = map.get(webhook_id) else {
            return Vec::new();
        };
        members
            .iter()
            .map(|handle| (Arc::clone(handle), handle.try_send(frame)))
            .collect()
    }

    /// Returns the number of subscribers registered under `webhook_id`.
    #[cfg(test)]
    pub async fn subscriber_count(&self, webhook_id: &str) -> usize {
        self.entries.lock().await.get(webhook_id).map_or(0, Vec::len)
    }

    /// Returns every identifier with its subscriber count, sorted by
    /// identifier.
    pub async fn entries(&self) -> Vec<EntrySummary> {
        let map = self.entries.lock().await;
        let mut summaries: Vec<EntrySummary> = map
            .iter()
            .map(|(webhook_id, members)| EntrySummary {
                webhook_id: webhook_id.clone(),
                connections: members.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.webhook_id.cmp(&b.webhook_id));
        summaries
    }

    /// Returns the number of identifiers with at least one subscriber.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns `true` if no subscriber is registered.
    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

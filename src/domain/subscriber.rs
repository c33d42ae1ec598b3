//! Subscriber handle: one live WebSocket connection as seen by the relay.
//!
//! The handle owns the sending half of a bounded outbound queue. The
//! connection task owns the receiving half and writes every queued frame to
//! the socket. The queue sender lives inside the lifecycle state, so a send
//! can only ever happen while the handle is `Open`: the state check and the
//! push are one locked step.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use super::WebhookId;

/// A serialized outbound message, shared between all recipients of one
/// webhook so that each of them gets byte-identical content.
pub type Frame = Arc<str>;

/// Unique identifier of a single subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(uuid::Uuid);

impl SubscriberId {
    /// Creates a new random `SubscriberId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public view of a connection's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Upgrade accepted, not yet registered.
    Connecting,
    /// Registered and eligible for deliveries.
    Open,
    /// Terminal.
    Closed,
}

/// Result of a single send attempt against one handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Frame was queued for the connection.
    Sent,
    /// Handle was not `Open`; nothing was attempted.
    Skipped,
    /// Handle was `Open` but the queue rejected the frame (full, or the
    /// connection task is gone). The subscriber is defunct.
    Failed,
}

#[derive(Debug)]
enum Lifecycle {
    Connecting(mpsc::Sender<Frame>),
    Open(mpsc::Sender<Frame>),
    Closed,
}

/// One live subscriber registered under a [`WebhookId`].
///
/// The gateway owns the handle for the lifetime of the connection; the
/// registry only keeps an `Arc` to it for membership.
#[derive(Debug)]
pub struct SubscriberHandle {
    id: SubscriberId,
    webhook_id: WebhookId,
    lifecycle: Mutex<Lifecycle>,
}

impl SubscriberHandle {
    /// Creates a handle in the `Connecting` state together with the
    /// receiving half of its outbound queue.
    ///
    /// A `queue_capacity` of zero is raised to one.
    #[must_use]
    pub fn new(webhook_id: WebhookId, queue_capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let handle = Self {
            id: SubscriberId::new(),
            webhook_id,
            lifecycle: Mutex::new(Lifecycle::Connecting(tx)),
        };
        (handle, rx)
    }

    /// Returns the unique connection identifier.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns the identifier this subscriber listens on.
    #[must_use]
    pub const fn webhook_id(&self) -> &WebhookId {
        &self.webhook_id
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        match &*self.lock() {
            Lifecycle::Connecting(_) => ConnectionState::Connecting,
            Lifecycle::Open(_) => ConnectionState::Open,
            Lifecycle::Closed => ConnectionState::Closed,
        }
    }

    /// Moves `Connecting → Open`. Returns `false` if the handle was not in
    /// the `Connecting` state.
    pub fn open(&self) -> bool {
        let mut guard = self.lock();
        match std::mem::replace(&mut *guard, Lifecycle::Closed) {
            Lifecycle::Connecting(tx) => {
                *guard = Lifecycle::Open(tx);
                true
            }
            other => {
                *guard = other;
                false
            }
        }
    }

    /// Moves the handle to `Closed`, dropping the queue sender so the
    /// connection task drains what is already queued and then stops.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn close(&self) -> bool {
        let previous = std::mem::replace(&mut *self.lock(), Lifecycle::Closed);
        !matches!(previous, Lifecycle::Closed)
    }

    /// Attempts to queue `frame` for this connection without waiting.
    pub fn try_send(&self, frame: &Frame) -> SendOutcome {
        match &*self.lock() {
            Lifecycle::Open(tx) => match tx.try_send(Arc::clone(frame)) {
                Ok(()) => SendOutcome::Sent,
                Err(_) => SendOutcome::Failed,
            },
            Lifecycle::Connecting(_) | Lifecycle::Closed => SendOutcome::Skipped,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn frame(text: &str) -> Frame {
        Arc::from(text)
    }

    #[test]
    fn starts_connecting_and_opens_once() {
        let (handle, _rx) = SubscriberHandle::new(WebhookId::new("abc"), 4);
        assert_eq!(handle.state(), ConnectionState::Connecting);
        assert!(handle.open());
        assert_eq!(handle.state(), ConnectionState::Open);
        assert!(!handle.open());
    }

    #[test]
    fn close_is_idempotent() {
        let (handle, _rx) = SubscriberHandle::new(WebhookId::new("abc"), 4);
        handle.open();
        assert!(handle.close());
        assert!(!handle.close());
        assert_eq!(handle.state(), ConnectionState::Closed);
        assert!(!handle.open());
    }

    #[test]
    fn send_skipped_unless_open() {
        let (handle, _rx) = SubscriberHandle::new(WebhookId::new("abc"), 4);
        assert_eq!(handle.try_send(&frame("x")), SendOutcome::Skipped);
        handle.open();
        handle.close();
        assert_eq!(handle.try_send(&frame("x")), SendOutcome::Skipped);
    }

    #[tokio::test]
    async fn open_handle_queues_frame() {
        let (handle, mut rx) = SubscriberHandle::new(WebhookId::new("abc"), 4);
        handle.open();
        assert_eq!(handle.try_send(&frame("hello")), SendOutcome::Sent);
        let Some(received) = rx.recv().await else {
            panic!("expected a queued frame");
        };
        assert_eq!(&*received, "hello");
    }

    #[test]
    fn dropped_receiver_fails_send() {
        let (handle, rx) = SubscriberHandle::new(WebhookId::new("abc"), 4);
        handle.open();
        drop(rx);
        assert_eq!(handle.try_send(&frame("x")), SendOutcome::Failed);
    }

    #[test]
    fn full_queue_fails_send() {
        let (handle, _rx) = SubscriberHandle::new(WebhookId::new("abc"), 1);
        handle.open();
        assert_eq!(handle.try_send(&frame("a")), SendOutcome::Sent);
        assert_eq!(handle.try_send(&frame("b")), SendOutcome::Failed);
    }

    #[tokio::test]
    async fn close_ends_receiver_after_drain() {
        let (handle, mut rx) = SubscriberHandle::new(WebhookId::new("abc"), 4);
        handle.open();
        handle.try_send(&frame("last"));
        handle.close();
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn zero_capacity_is_raised() {
        let (handle, _rx) = SubscriberHandle::new(WebhookId::new("abc"), 0);
        handle.open();
        assert_eq!(handle.try_send(&frame("x")), SendOutcome::Sent);
    }

    #[test]
    fn ids_are_unique() {
        let (a, _ra) = SubscriberHandle::new(WebhookId::new("abc"), 1);
        let (b, _rb) = SubscriberHandle::new(WebhookId::new("abc"), 1);
        assert_ne!(a.id(), b.id());
    }
}

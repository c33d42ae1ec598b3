//! Relay service: subscriber lifecycle and webhook fan-out.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{
    Frame, SendOutcome, SubscriberHandle, SubscriberRegistry, WebhookEvent, WebhookId,
};
use crate::error::RelayError;

/// Per-webhook delivery tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Snapshot members a send was considered for.
    pub attempted: usize,
    /// Frames queued for an open subscriber.
    pub delivered: usize,
    /// Members that were not open at send time.
    pub skipped: usize,
    /// Open members whose send failed; these were unregistered.
    pub failed: usize,
}

impl DeliveryReport {
    fn record(&mut self, outcome: SendOutcome) {
        self.attempted += 1;
        match outcome {
            SendOutcome::Sent => self.delivered += 1,
            SendOutcome::Skipped => self.skipped += 1,
            SendOutcome::Failed => self.failed += 1,
        }
    }
}

/// Orchestration layer between the gateway and the registry.
///
/// Owns a reference to the injected [`SubscriberRegistry`]. Connection
/// tasks call [`connect`](Self::connect) and
/// [`disconnect`](Self::disconnect); the webhook handler calls
/// [`deliver`](Self::deliver).
#[derive(Debug, Clone)]
pub struct RelayService {
    registry: Arc<SubscriberRegistry>,
    queue_capacity: usize,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(registry: Arc<SubscriberRegistry>, queue_capacity: usize) -> Self {
        Self {
            registry,
            queue_capacity,
        }
    }

    /// Returns a reference to the inner [`SubscriberRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Opens a subscriber for `webhook_id` and registers it.
    ///
    /// Returns the handle and the receiving end of its outbound queue.
    pub async fn connect(
        &self,
        webhook_id: WebhookId,
    ) -> (Arc<SubscriberHandle>, mpsc::Receiver<Frame>) {
        let (handle, rx) = SubscriberHandle::new(webhook_id, self.queue_capacity);
        let handle = Arc::new(handle);
        handle.open();
        let subscribers = self.registry.register(Arc::clone(&handle)).await;
        tracing::info!(
            webhook_id = %handle.webhook_id(),
            subscriber_id = %handle.id(),
            subscribers,
            "subscriber connected"
        );
        (handle, rx)
    }

    /// Closes `handle` and removes it from the registry.
    ///
    /// Safe to call any number of times.
    pub async fn disconnect(&self, handle: &SubscriberHandle) {
        let closed_now = handle.close();
        let removed = self.registry.unregister(handle).await;
        if closed_now || removed {
            tracing::info!(
                webhook_id = %handle.webhook_id(),
                subscriber_id = %handle.id(),
                "subscriber disconnected"
            );
        }
    }

    /// Pushes `event` to every subscriber currently registered under its
    /// identifier.
    ///
    /// Subscribers whose send fails are closed and unregistered; delivery
    /// to the others is unaffected. An event with no subscribers is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialization`] if the payload cannot be
    /// encoded. No send is attempted in that case.
    pub async fn deliver(&self, event: &WebhookEvent) -> Result<DeliveryReport, RelayError> {
        let frame = event.to_frame()?;
        let webhook_id = &event.webhook_id;

        let outcomes = self.registry.broadcast(webhook_id.as_str(), &frame).await;
        if outcomes.is_empty() {
            tracing::info!(%webhook_id, "no subscribers connected, webhook dropped");
            return Ok(DeliveryReport::default());
        }

        let mut report = DeliveryReport::default();
        for (handle, outcome) in outcomes {
            report.record(outcome);
            if outcome == SendOutcome::Failed {
                tracing::warn!(
                    %webhook_id,
                    subscriber_id = %handle.id(),
                    "send failed, dropping subscriber"
                );
                self.disconnect(&handle).await;
            }
        }

        tracing::info!(
            %webhook_id,
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "webhook broadcast"
        );
        Ok(report)
    }
}

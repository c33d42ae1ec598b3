//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service owning the subscriber registry.
    pub relay_service: Arc<RelayService>,
    /// Configuration the server was started with.
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Builds the state around a fresh, empty registry.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let registry = Arc::new(crate::domain::SubscriberRegistry::new());
        let relay_service = Arc::new(RelayService::new(
            registry,
            config.subscriber_queue_capacity,
        ));
        Self {
            relay_service,
            config: Arc::new(config),
        }
    }
}

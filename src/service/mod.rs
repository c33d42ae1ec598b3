//! Service layer: relay orchestration.
//!
//! [`RelayService`] drives the subscriber lifecycle against the
//! [`super::domain::SubscriberRegistry`] and fans webhook events out to
//! every registered subscriber.

pub mod relay_service;

pub use relay_service::{DeliveryReport, RelayService};

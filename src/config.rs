//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Key                         | Default            |
//! |-----------------------------|--------------------|
//! | `LISTEN_ADDR`               | `0.0.0.0:{PORT}`   |
//! | `PORT`                      | `3001`             |
//! | `SERVICE_NAME`              | `Webhook Relay`    |
//! | `SUBSCRIBER_QUEUE_CAPACITY` | `256`              |
//! | `MAX_WEBHOOK_BODY_BYTES`    | `1048576`          |

use std::net::SocketAddr;

use crate::error::RelayError;

/// Default TCP port when neither `LISTEN_ADDR` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3001;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Name reported by the informational endpoint.
    pub service_name: String,

    /// Capacity of each subscriber's outbound queue. A subscriber whose
    /// queue is full when a webhook arrives is treated as defunct.
    pub subscriber_queue_capacity: usize,

    /// Largest accepted webhook body, in bytes.
    pub max_webhook_body_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            service_name: "Webhook Relay".to_string(),
            subscriber_queue_capacity: 256,
            max_webhook_body_bytes: 1024 * 1024,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` or `PORT` is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` or `PORT` is set but
    /// cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RelayError> {
        let defaults = Self::default();

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|e| RelayError::Config(format!("LISTEN_ADDR={raw}: {e}")))?,
            None => {
                let port = match lookup("PORT") {
                    Some(raw) => raw
                        .parse::<u16>()
                        .map_err(|e| RelayError::Config(format!("PORT={raw}: {e}")))?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let service_name = lookup("SERVICE_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.service_name);

        let subscriber_queue_capacity = parse_or(
            &lookup,
            "SUBSCRIBER_QUEUE_CAPACITY",
            defaults.subscriber_queue_capacity,
        );
        let max_webhook_body_bytes =
            parse_or(&lookup, "MAX_WEBHOOK_BODY_BYTES", defaults.max_webhook_body_bytes);

        Ok(Self {
            listen_addr,
            service_name,
            subscriber_queue_capacity,
            max_webhook_body_bytes,
        })
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

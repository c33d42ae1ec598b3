//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use crate::api::dto::{ActiveConnectionDto, HealthResponse, InfoResponse, UsageInfo};
use crate::api::handlers::{system, webhook};
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI description of every HTTP endpoint. The WebSocket channel at
/// `/ws?id={id}` is not part of it.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "webhook-relay",
        description = "Relays inbound webhooks to live WebSocket subscribers."
    ),
    paths(
        webhook::receive_webhook,
        system::info_handler,
        system::health_handler,
    ),
    components(schemas(
        InfoResponse,
        UsageInfo,
        HealthResponse,
        ActiveConnectionDto,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Webhooks", description = "Webhook ingestion"),
        (name = "System", description = "Usage and health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/webhook/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
        assert!(paths.iter().any(|p| p.as_str() == "/"));
    }
}

//! HTTP layer: route handlers, DTOs, OpenAPI and router composition.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the HTTP router with every REST endpoint.
pub fn build_router(max_webhook_body_bytes: usize) -> Router<AppState> {
    handlers::routes(max_webhook_body_bytes)
}

/// Builds the complete application: REST endpoints, the `/ws`
/// subscription channel, Swagger UI (with the `swagger-ui` feature),
/// tracing and permissive CORS.
pub fn build_app(state: AppState) -> Router {
    let router = Router::new()
        .merge(build_router(state.config.max_webhook_body_bytes))
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use crate::domain::WebhookId;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(RelayConfig::default())
    }

    async fn body_string(response: axum::response::Response) -> String {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let text = body_string(response).await;
        let Ok(value) = serde_json::from_str(&text) else {
            panic!("body is not JSON: {text}");
        };
        value
    }

    fn webhook_request(id: &str, content_type: &str, body: &'static str) -> Request<Body> {
        let Ok(request) = Request::builder()
            .method("POST")
            .uri(format!("/webhook/{id}"))
            .header("content-type", content_type)
            .header("aq-event-type", "order.created")
            .header("aq-activity-job-id", "job-1")
            .body(Body::from(body))
        else {
            panic!("valid request");
        };
        request
    }

    fn get(uri: &str) -> Request<Body> {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        request
    }

    #[tokio::test]
    async fn webhook_without_subscribers_is_acknowledged() {
        let app = build_app(state());
        let Ok(response) = app
            .oneshot(webhook_request("nobody", "application/json", r#"{"x":1}"#))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, handlers::webhook::WEBHOOK_ACK);
    }

    #[tokio::test]
    async fn webhook_is_pushed_to_subscriber() {
        let state = state();
        let (_handle, mut rx) = state
            .relay_service
            .connect(WebhookId::new("abc"))
            .await;
        let app = build_app(state.clone());

        let Ok(response) = app
            .oneshot(webhook_request("abc", "application/json", r#"{"x":1}"#))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, handlers::webhook::WEBHOOK_ACK);

        let Some(frame) = rx.recv().await else {
            panic!("subscriber should receive the webhook");
        };
        let Ok(payload) = serde_json::from_str::<serde_json::Value>(&frame) else {
            panic!("frame is not JSON");
        };
        assert_eq!(
            payload,
            serde_json::json!({
                "id": "abc",
                "eventType": "order.created",
                "content": {"x": 1},
                "headers": {
                    "aq-event-type": "order.created",
                    "aq-activity-job-id": "job-1"
                }
            })
        );
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_without_delivery() {
        let state = state();
        let (_handle, mut rx) = state
            .relay_service
            .connect(WebhookId::new("abc"))
            .await;
        let app = build_app(state.clone());

        let Ok(response) = app
            .oneshot(webhook_request("abc", "application/json", "{oops"))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 1001);
        assert!(rx.try_recv().is_err());
        assert_eq!(state.relay_service.registry().subscriber_count("abc").await, 1);
    }

    #[tokio::test]
    async fn oversized_webhook_is_rejected() {
        let config = RelayConfig {
            max_webhook_body_bytes: 4,
            ..RelayConfig::default()
        };
        let app = build_app(AppState::new(config));
        let Ok(response) = app
            .oneshot(webhook_request("abc", "text/plain", "far too long"))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn health_lists_active_identifiers() {
        let state = state();
        let (_a, _ra) = state.relay_service.connect(WebhookId::new("abc")).await;
        let (_b, _rb) = state.relay_service.connect(WebhookId::new("abc")).await;
        let (_c, _rc) = state.relay_service.connect(WebhookId::new("xyz")).await;
        let app = build_app(state.clone());

        let Ok(response) = app.oneshot(get("/health")).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(
            body["activeConnections"],
            serde_json::json!([
                {"webhookId": "abc", "connections": 2},
                {"webhookId": "xyz", "connections": 1}
            ])
        );
        assert_eq!(state.relay_service.registry().len().await, 2);
    }

    #[tokio::test]
    async fn health_is_empty_without_subscribers() {
        let app = build_app(state());
        let Ok(response) = app.oneshot(get("/health")).await else {
            panic!("request failed");
        };
        let body = body_json(response).await;
        assert_eq!(body["activeConnections"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn root_describes_usage_with_request_host() {
        let app = build_app(state());
        let Ok(request) = Request::builder()
            .uri("/")
            .header("host", "relay.example:3001")
            .body(Body::empty())
        else {
            panic!("valid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["service"], "Webhook Relay");
        assert_eq!(
            body["usage"]["webhook"],
            "http://relay.example:3001/webhook/:id"
        );
        assert_eq!(
            body["usage"]["websocket"],
            "ws://relay.example:3001/ws?id=:id"
        );
    }

    #[tokio::test]
    async fn root_honors_forwarded_proto() {
        let app = build_app(state());
        let Ok(request) = Request::builder()
            .uri("/")
            .header("host", "relay.example")
            .header("x-forwarded-proto", "https, http")
            .body(Body::empty())
        else {
            panic!("valid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("request failed");
        };
        let body = body_json(response).await;
        assert_eq!(body["usage"]["webhook"], "https://relay.example/webhook/:id");
        assert_eq!(body["usage"]["websocket"], "wss://relay.example/ws?id=:id");
    }

    #[tokio::test]
    async fn webhook_without_content_type_relays_empty_object() {
        let state = state();
        let (_handle, mut rx) = state
            .relay_service
            .connect(WebhookId::new("abc"))
            .await;
        let app = build_app(state.clone());
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/webhook/abc")
            .body(Body::from("plain bytes"))
        else {
            panic!("valid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);

        let Some(frame) = rx.recv().await else {
            panic!("subscriber should receive the webhook");
        };
        let Ok(payload) = serde_json::from_str::<serde_json::Value>(&frame) else {
            panic!("frame is not JSON");
        };
        assert_eq!(payload["content"], serde_json::json!({}));
    }
}

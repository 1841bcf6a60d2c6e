//! REST API endpoints
//!
//! This module contains all API endpoint handlers for the gateway.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::database::traits::Connector;
use crate::registry::ConnectionRegistry;

pub mod connect;
pub mod disconnect;
pub mod health;
pub mod query;
pub mod schema;

// Re-export handlers for convenience
pub use connect::connect_handler;
pub use disconnect::disconnect_handler;
pub use health::health_handler;
pub use query::execute_query_handler;
pub use schema::schema_handler;

/// Create the API router with all endpoints
///
/// # Arguments
///
/// * `registry` - Shared connection registry used by every handler
///
/// # Returns
///
/// An Axum Router configured with all API routes
pub fn create_api_router<C: Connector>(registry: Arc<ConnectionRegistry<C>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/connect", post(connect_handler::<C>))
        .route("/query", post(execute_query_handler::<C>))
        .route("/schema", post(schema_handler::<C>))
        .route("/disconnect", post(disconnect_handler::<C>))
        .with_state(registry)
}

/// Treat empty strings the same as absent values
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeConnector;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn unknown_route_is_404() {
        let registry = Arc::new(ConnectionRegistry::new(FakeConnector::default()));
        let app = create_api_router(registry);

        let response = app
            .oneshot(Request::builder().uri("/tables").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_keeps_json_envelope() {
        let registry = Arc::new(ConnectionRegistry::new(FakeConnector::default()));
        let app = create_api_router(registry);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/connect")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[test]
    fn empty_strings_count_as_missing() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("x".into())), Some("x".into()));
    }
}

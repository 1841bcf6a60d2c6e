//! SqlGatewayLayer - Main Axum integration layer
//!
//! This module provides the main entry point for mounting the gateway API and
//! landing page into an Axum application.

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::create_api_router;
use crate::database::traits::Connector;
use crate::frontend::create_frontend_router;
use crate::registry::{ConnectionRegistry, RegistryConfig};

#[cfg(feature = "postgres")]
use crate::database::postgres::PostgresConnector;

/// Main layer for mounting the SQL gateway into an Axum application
///
/// The layer owns the [`ConnectionRegistry`]. Keep a handle from
/// [`SqlGatewayLayer::registry`] before calling `into_router` so the
/// registry can be drained at shutdown.
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use axum_sql_gateway::SqlGatewayLayer;
///
/// # async fn example() {
/// let gateway = SqlGatewayLayer::postgres("");
/// let registry = gateway.registry();
/// let app = Router::new().merge(gateway.into_router());
/// // ... serve app, then on shutdown:
/// registry.close_all().await;
/// # }
/// ```
pub struct SqlGatewayLayer<C: Connector> {
    base_path: String,
    registry: Arc<ConnectionRegistry<C>>,
}

impl<C: Connector> SqlGatewayLayer<C> {
    /// Create a new gateway at the given base path
    ///
    /// # Arguments
    ///
    /// * `base_path` - URL path where the gateway is mounted (e.g., "/sql"), or
    ///   an empty string to mount at the root
    /// * `connector` - Opens pooled connections for client requests
    pub fn new(base_path: impl Into<String>, connector: C) -> Self {
        Self::with_config(base_path, connector, RegistryConfig::default())
    }

    /// Create a new gateway with custom registry limits
    pub fn with_config(base_path: impl Into<String>, connector: C, config: RegistryConfig) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            base_path,
            registry: Arc::new(ConnectionRegistry::with_config(connector, config)),
        }
    }

    /// Shared handle to the connection registry
    pub fn registry(&self) -> Arc<ConnectionRegistry<C>> {
        self.registry.clone()
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// The returned router includes:
    /// - Landing page at `{base_path}/`
    /// - API endpoints at `{base_path}/api/*`
    /// - Permissive CORS middleware for browser clients
    pub fn into_router(self) -> Router {
        let api_router = create_api_router(self.registry);
        let frontend_router = create_frontend_router(self.base_path.clone());

        // Axum 0.8 refuses to nest at the root, so merge in that case
        let router = if self.base_path.is_empty() {
            Router::new()
                .nest("/api", api_router)
                .merge(frontend_router)
        } else {
            Router::new()
                .nest(&format!("{}/api", self.base_path), api_router)
                .nest(&self.base_path, frontend_router)
        };

        router.layer(CorsLayer::permissive())
    }
}

#[cfg(feature = "postgres")]
impl SqlGatewayLayer<PostgresConnector> {
    /// Create a new gateway for PostgreSQL databases
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the gateway will be mounted
    pub fn postgres(base_path: impl Into<String>) -> Self {
        Self::new(base_path, PostgresConnector)
    }
}

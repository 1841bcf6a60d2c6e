//! Connection establishment endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use std::sync::Arc;

use crate::database::traits::Connector;
use crate::error::GatewayError;
use crate::registry::ConnectionRegistry;
use crate::schema::{ConnectRequest, ConnectResponse};

/// Handler for POST /api/connect
///
/// Opens a pooled connection and registers it.
///
/// Request body:
/// ```json
/// {
///   "host": "db.example.com",
///   "database": "app",
///   "username": "reader",
///   "password": "secret"
/// }
/// ```
///
/// An optional `port` may be given (default 5432).
///
/// Response:
/// ```json
/// {
///   "success": true,
///   "connectionId": "conn_6f1c...",
///   "message": "Connected successfully",
///   "serverInfo": { "host": "db.example.com", "database": "app", "username": "reader" }
/// }
/// ```
///
/// Missing fields yield 400; an unreachable database or failed liveness check yields 500.
pub async fn connect_handler<C: Connector>(
    State(registry): State<Arc<ConnectionRegistry<C>>>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>, GatewayError> {
    let Json(request) = payload?;

    let (connection_id, server_info) = registry.create(request).await.inspect_err(|error| {
        tracing::error!(error = %error, "Failed to connect");
    })?;

    Ok(Json(ConnectResponse {
        success: true,
        connection_id: connection_id.to_string(),
        message: "Connected successfully".to_string(),
        server_info,
    }))
}

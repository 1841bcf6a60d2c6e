//! Connection teardown endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use std::sync::Arc;

use crate::api::non_empty;
use crate::database::traits::Connector;
use crate::error::GatewayError;
use crate::registry::ConnectionRegistry;
use crate::schema::{ConnectionRequest, MessageResponse};

/// Handler for POST /api/disconnect
///
/// Closes the pool behind `connectionId`. Unknown or already closed
/// identifiers succeed as well.
pub async fn disconnect_handler<C: Connector>(
    State(registry): State<Arc<ConnectionRegistry<C>>>,
    payload: Result<Json<ConnectionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, GatewayError> {
    let Json(request) = payload?;

    if let Some(connection_id) = non_empty(request.connection_id) {
        registry.remove(&connection_id).await.inspect_err(|error| {
            tracing::error!(connection_id = %connection_id, error = %error, "Failed to disconnect");
        })?;
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Disconnected successfully".to_string(),
    }))
}

//! Schema introspection endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use std::sync::Arc;

use crate::api::non_empty;
use crate::database::traits::{Connector, DatabaseProvider};
use crate::error::GatewayError;
use crate::registry::ConnectionRegistry;
use crate::schema::{ConnectionRequest, SchemaResponse};

/// Handler for POST /api/schema
///
/// Returns every base table of the default schema with its columns in
/// declaration order.
///
/// Response:
/// ```json
/// {
///   "success": true,
///   "schema": {
///     "users": [
///       { "name": "id", "dataType": "integer", "nullable": false,
///         "defaultValue": "nextval('users_id_seq'::regclass)", "keyType": "PRIMARY KEY" }
///     ]
///   }
/// }
/// ```
pub async fn schema_handler<C: Connector>(
    State(registry): State<Arc<ConnectionRegistry<C>>>,
    payload: Result<Json<ConnectionRequest>, JsonRejection>,
) -> Result<Json<SchemaResponse>, GatewayError> {
    let Json(request) = payload?;

    let connection_id = non_empty(request.connection_id).ok_or(GatewayError::InvalidConnection)?;
    let database = registry
        .lookup(&connection_id)
        .await
        .ok_or(GatewayError::InvalidConnection)?;

    let schema = database.introspect_schema().await.map_err(|error| {
        tracing::error!(connection_id = %connection_id, error = %error, "Schema introspection failed");
        GatewayError::Internal(error.to_string())
    })?;

    Ok(Json(SchemaResponse {
        success: true,
        schema,
    }))
}

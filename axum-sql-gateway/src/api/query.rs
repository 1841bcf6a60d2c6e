//! Read-only SQL query execution endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use std::sync::Arc;

use crate::api::non_empty;
use crate::database::traits::{Connector, DatabaseProvider};
use crate::error::GatewayError;
use crate::gate::{self, Verdict};
use crate::registry::ConnectionRegistry;
use crate::schema::{QueryRequest, QueryResponse};

/// Handler for POST /api/query
///
/// Executes a SQL statement on an open connection after it passes the
/// read-only gate. The statement is sent exactly as submitted.
///
/// Request body:
/// ```json
/// {
///   "connectionId": "conn_6f1c...",
///   "query": "SELECT id, email FROM users LIMIT 10"
/// }
/// ```
///
/// Response:
/// ```json
/// {
///   "success": true,
///   "rows": [{ "id": 1, "email": "a@example.com" }],
///   "rowCount": 1,
///   "executionTime": 4,
///   "fields": [{ "name": "id", "dataTypeID": 23 }, { "name": "email", "dataTypeID": 25 }]
/// }
/// ```
///
/// Response (database error, 400):
/// ```json
/// {
///   "success": false,
///   "error": "Table does not exist",
///   "detail": "relation \"user\" does not exist",
///   "query": "SELECT * FROM user",
///   "position": 15
/// }
/// ```
///
/// Statements rejected by the gate yield 403.
pub async fn execute_query_handler<C: Connector>(
    State(registry): State<Arc<ConnectionRegistry<C>>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, GatewayError> {
    let Json(request) = payload?;

    let (Some(connection_id), Some(query)) =
        (non_empty(request.connection_id), non_empty(request.query))
    else {
        return Err(GatewayError::MissingParameters("connectionId and query"));
    };

    let database = registry
        .lookup(&connection_id)
        .await
        .ok_or(GatewayError::InvalidConnection)?;

    if let Verdict::Rejected { reason } = gate::classify(&query) {
        tracing::warn!(connection_id = %connection_id, reason, "Query rejected by gate");
        return Err(GatewayError::Forbidden { reason });
    }

    tracing::debug!(connection_id = %connection_id, query = %query, "Executing query");

    match database.execute_query(&query).await {
        Ok(result) => Ok(Json(QueryResponse {
            success: true,
            result,
        })),
        Err(error) => {
            tracing::error!(connection_id = %connection_id, error = %error, "Query failed");
            Err(GatewayError::execution(error, &query))
        }
    }
}

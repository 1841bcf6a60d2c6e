//! Gateway error type with automatic HTTP status mapping
//!
//! Every failure is rendered as `{"success": false, "error": "..."}`, with
//! extra context for statements the database rejected.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::database::traits::{describe_error_code, DatabaseError};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required connection fields are missing (400)
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    /// Request parameters are missing (400)
    #[error("Missing required parameters: {0}")]
    MissingParameters(&'static str),

    /// Request body could not be parsed (400)
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// Pool creation or liveness check failed (500)
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Identifier does not resolve to an open connection (400)
    #[error("Invalid connection ID")]
    InvalidConnection,

    /// Statement rejected by the query gate (403)
    #[error("Query rejected: {reason}")]
    Forbidden { reason: &'static str },

    /// The database rejected the statement (400)
    #[error("{message}")]
    Execution {
        /// Readable description of the failure
        message: String,

        /// Raw database message
        detail: String,

        /// Statement as submitted
        query: String,

        /// 1-based character offset of the error, if reported
        position: Option<usize>,
    },

    /// Introspection or teardown failed (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Build an execution error for a failed statement
    pub fn execution(error: DatabaseError, query: &str) -> Self {
        match error {
            DatabaseError::Execution {
                message,
                code,
                position,
            } => Self::Execution {
                message: describe_error_code(code.as_deref(), &message),
                detail: message,
                query: query.to_string(),
                position,
            },
            other => {
                let detail = other.to_string();
                Self::Execution {
                    message: detail.clone(),
                    detail,
                    query: query.to_string(),
                    position: None,
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::MissingParameters(_)
            | Self::BadRequest(_)
            | Self::InvalidConnection
            | Self::Execution { .. } => StatusCode::BAD_REQUEST,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Connection(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Forbidden { reason } => json!({
                "success": false,
                "error": "Only read queries are allowed for security reasons",
                "reason": reason,
            }),
            Self::Execution {
                message,
                detail,
                query,
                position,
            } => json!({
                "success": false,
                "error": message,
                "detail": detail,
                "query": query,
                "position": position,
            }),
            _ => json!({
                "success": false,
                "error": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: GatewayError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_is_400_and_lists_fields() {
        let (status, body) = body_of(GatewayError::Validation {
            missing: vec!["host", "password"],
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing required fields: host, password");
    }

    #[tokio::test]
    async fn forbidden_is_403() {
        let (status, body) = body_of(GatewayError::Forbidden {
            reason: crate::gate::REJECTION_REASON,
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "only read queries allowed");
    }

    #[tokio::test]
    async fn connection_error_is_500() {
        let (status, _) = body_of(GatewayError::Connection("refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn invalid_connection_is_400() {
        let (status, body) = body_of(GatewayError::InvalidConnection).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid connection ID");
    }

    #[tokio::test]
    async fn execution_error_maps_known_code_and_keeps_context() {
        let error = GatewayError::execution(
            DatabaseError::Execution {
                message: "relation \"foo\" does not exist".into(),
                code: Some("42P01".into()),
                position: Some(15),
            },
            "SELECT * FROM foo",
        );

        let (status, body) = body_of(error).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Table does not exist");
        assert_eq!(body["detail"], "relation \"foo\" does not exist");
        assert_eq!(body["query"], "SELECT * FROM foo");
        assert_eq!(body["position"], 15);
    }

    #[tokio::test]
    async fn execution_error_passes_unknown_code_through() {
        let error = GatewayError::execution(
            DatabaseError::Execution {
                message: "division by zero".into(),
                code: Some("22012".into()),
                position: None,
            },
            "SELECT 1/0",
        );

        let (_, body) = body_of(error).await;
        assert_eq!(body["error"], "division by zero");
        assert!(body["position"].is_null());
    }
}

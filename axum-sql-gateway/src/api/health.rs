//! Health check endpoint

use axum::Json;

use crate::schema::HealthResponse;

/// Handler for GET /api/health
///
/// Always succeeds; it does not touch any database.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok",
        message: "SQL gateway is running",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_returns_ok() {
        let Json(body) = health_handler().await;
        assert!(body.success);
        assert_eq!(body.status, "ok");
        assert!(chrono::DateTime::parse_from_rfc3339(&body.timestamp).is_ok());
    }
}

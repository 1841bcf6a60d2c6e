//! Landing page serving
//!
//! This module serves the embedded browser client with proper caching, MIME
//! types and base path injection so it works under any mount point.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use include_dir::{include_dir, Dir};
use std::sync::Arc;

// Embed the client at compile time
static FRONTEND_DISTRIBUTION: Dir = include_dir!("$CARGO_MANIFEST_DIR/frontend/dist");

/// State for frontend serving (stores base path for routing)
#[derive(Clone)]
pub struct FrontendState {
    pub base_path: Arc<String>,
}

impl FrontendState {
    /// Create a new frontend state with the given base path
    pub fn new(base_path: String) -> Self {
        Self {
            base_path: Arc::new(base_path),
        }
    }
}

/// Create a router for serving the landing page
///
/// This returns a Router that serves:
/// - GET / -> index.html with injected <base href> tag
/// - GET /assets/* -> static assets with long-term caching
///
/// # Arguments
///
/// * `base_path` - The base URL path where the gateway is mounted ("" for root)
pub fn create_frontend_router(base_path: String) -> Router {
    let state = FrontendState::new(base_path);

    // Note: Axum 0.8 uses {*wildcard} syntax for wildcard captures
    Router::new()
        .route("/", get(serve_index_page))
        .route("/assets/{*path}", get(serve_static_asset))
        .with_state(state)
}

/// Insert a `<base href>` tag right after `<head>`
fn inject_base_tag(html: &str, base_path: &str) -> String {
    let mut contents = html.to_string();
    if let Some(head_position) = contents.find("<head>") {
        let insert_position = head_position + "<head>".len();
        let base_tag = format!("\n    <base href=\"{}/\">", base_path);
        contents.insert_str(insert_position, &base_tag);
    }
    contents
}

/// Serve the index.html file at the root path
///
/// Caching: max-age=3600 (1 hour) for index.html
async fn serve_index_page(State(state): State<FrontendState>) -> Response {
    let Some(file) = FRONTEND_DISTRIBUTION.get_file("index.html") else {
        return serve_fallback_page();
    };

    let contents = inject_base_tag(&String::from_utf8_lossy(file.contents()), &state.base_path);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        contents,
    )
        .into_response()
}

/// Serve static assets with proper MIME types
///
/// Caching: max-age=31536000 (1 year) for static assets
async fn serve_static_asset(Path(path): Path<String>) -> Response {
    let asset_path = format!("assets/{}", path);

    match FRONTEND_DISTRIBUTION.get_file(&asset_path) {
        Some(file) => {
            let mime_type = mime_guess::from_path(&asset_path)
                .first_or_octet_stream()
                .to_string();

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime_type),
                    (
                        header::CACHE_CONTROL,
                        "public, max-age=31536000, immutable".to_string(),
                    ),
                ],
                file.contents(),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Asset not found: {}", asset_path),
        )
            .into_response(),
    }
}

/// Minimal page used when the embedded index is missing
fn serve_fallback_page() -> Response {
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>SQL Gateway</title>
</head>
<body>
    <h1>SQL Gateway</h1>
    <p>The browser client is not bundled in this build. The API is available:</p>
    <ul>
        <li><code>GET /api/health</code></li>
        <li><code>POST /api/connect</code></li>
        <li><code>POST /api/query</code></li>
        <li><code>POST /api/schema</code></li>
        <li><code>POST /api/disconnect</code></li>
    </ul>
</body>
</html>
"#;

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        html,
    )
        .into_response()
}

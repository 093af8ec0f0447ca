use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use super::AppState;
use crate::assets::StaticAssets;
use crate::services::PageResolution;

/// Body served when a query matches no catalog school.
const NOT_FOUND_BODY: &str =
    "<h1>School Not Found</h1><p>We could not find a match for this school in our records.</p>";

/// Body served for any internal failure. Deliberately generic; details stay
/// in the logs.
const GENERIC_ERROR_BODY: &str = "An error occurred while processing your request.";

const MISSING_QUERY_BODY: &str = "Missing school name query.";

/// GET /api/school/:query - the whole pipeline behind one route.
pub async fn school_page(
    Path(query): Path<String>,
    State(state): State<AppState>,
) -> Response {
    if query.trim().is_empty() {
        return Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .body(Body::from(MISSING_QUERY_BODY))
            .unwrap();
    }

    match state.page_service.fetch_page(&query).await {
        Ok(PageResolution::Page { html, .. }) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html")
            .body(Body::from(html))
            .unwrap(),
        Ok(PageResolution::NotFound) => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(header::CONTENT_TYPE, "text/html")
            .body(Body::from(NOT_FOUND_BODY))
            .unwrap(),
        Err(e) => {
            error!("Failed to serve page for query \"{}\": {}", query, e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from(GENERIC_ERROR_BODY))
                .unwrap()
        }
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "school-pages",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn index() -> impl IntoResponse {
    serve_embedded_asset("static/index.html").await
}

pub async fn serve_static_asset(Path(path): Path<String>) -> impl IntoResponse {
    let asset_path = format!("static/{}", path);
    serve_embedded_asset(&asset_path).await
}

async fn serve_embedded_asset(path: &str) -> impl IntoResponse {
    match StaticAssets::get_asset(path) {
        Some(asset) => {
            let content_type = StaticAssets::get_content_type(path);
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CACHE_CONTROL, "public, max-age=31536000")
                .body(Body::from(asset.data.to_vec()))
                .unwrap()
        }
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Asset not found"))
            .unwrap(),
    }
}

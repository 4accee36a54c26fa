/**
 * Router Configuration
 *
 * Combines the API routes, the health probe and the public media
 * directory into one router, then applies request tracing.
 *
 * # Route Order
 *
 * 1. `GET /health`
 * 2. API routes under `/api`
 * 3. Static media under `/media`
 * 4. JSON 404 fallback
 */

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::media::storage::MEDIA_ROUTE;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> BackendError {
    BackendError::not_found("Route not found")
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Shared application state
///
/// # Returns
///
/// Router with state applied, ready to serve
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(health));

    let router = configure_api_routes(router, app_state.config.max_upload_bytes);

    let router = router.nest_service(MEDIA_ROUTE, ServeDir::new(app_state.media.root()));

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

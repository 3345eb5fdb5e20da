use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, token};
use crate::state::AppState;
use std::sync::Arc;

/// Create the HTTP API router
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/favicon.ico", get(api::favicon))
        .route("/api/scribe-token", post(token::scribe_token))
        .route("/api/test-keys", post(token::test_keys))
        .layer(TraceLayer::new_for_http())
}

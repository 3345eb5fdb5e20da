//! Route assembly.

pub mod api;
pub mod ws;

use axum::{Router, middleware};
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::middleware::connection_limit_middleware;
use crate::state::AppState;

/// Rates at or above this disable rate limiting entirely
const RATE_LIMIT_DISABLED_THRESHOLD: u32 = 100_000;

/// Build the complete application: API routes, the relay WebSocket, the
/// static client and the protection layers.
///
/// The router must be served with `into_make_service_with_connect_info::<SocketAddr>()`
/// so the connection limit and rate limit layers can see the client address.
pub fn create_app(state: Arc<AppState>) -> Router {
    let config = &state.config;

    let ws_routes = ws::create_ws_router().layer(middleware::from_fn_with_state(
        state.clone(),
        connection_limit_middleware,
    ));

    let rps = config.rate_limit_requests_per_second;
    let burst = config.rate_limit_burst_size;
    let governor_layer = if rps < RATE_LIMIT_DISABLED_THRESHOLD {
        let governor_config = GovernorConfigBuilder::default()
            .per_second(rps as u64)
            .burst_size(burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish();
        if governor_config.is_none() {
            warn!(rps, burst, "Invalid rate limit settings, rate limiting disabled");
        }
        governor_config.map(GovernorLayer::new)
    } else {
        info!("Rate limiting disabled (rate >= {RATE_LIMIT_DISABLED_THRESHOLD}/s)");
        None
    };
    let cors_layer = build_cors_layer(config);

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    let static_files = ServeDir::new(&config.static_dir);

    api::create_api_router()
        .merge(ws_routes)
        .fallback_service(static_files)
        .with_state(state)
        .layer(cors_layer)
        .layer(tower::util::option_layer(governor_layer))
        .layer(security_headers)
}

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    match config.cors_allowed_origins.as_deref() {
        Some("*") => base.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            base.allow_origin(origins)
        }
        None => {
            info!("CORS not configured, defaulting to same-origin only");
            base
        }
    }
}

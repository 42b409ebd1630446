//! HTTP route handlers.

pub mod caption;
pub mod health;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Local dev origin allowed alongside the configured frontend.
const LOOPBACK_ORIGIN: &str = "http://127.0.0.1:5173";

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let cors = cors_layer(&state.config.frontend_origin);

    Router::new()
        .merge(health::routes())
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new().merge(caption::routes())
}

fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = [frontend_origin, LOOPBACK_ORIGIN]
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

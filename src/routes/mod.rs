//! HTTP routes.
//!
//! The only route is the tracking pixel. Everything else falls through to
//! axum's default 404. The pixel response carries a `Cache-Control` header
//! that forbids caching, so every open reaches the server.
//!
//! Every request passes through the request ID middleware first, so the open
//! recorded by the handler carries the same ID as the request's span.

pub mod track;

use axum::{
    http::header::{HeaderValue, CACHE_CONTROL},
    middleware,
    routing::get,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_PIXEL, TRACK_PATH};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with the tracking route and its cache headers.
pub fn create_router(state: AppState) -> Router {
    let track_routes = Router::new()
        .route(TRACK_PATH, get(track::pixel))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_PIXEL),
        ));

    Router::new()
        .merge(track_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

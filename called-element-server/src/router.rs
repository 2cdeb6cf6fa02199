//! Router construction for the called-element server.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handlers;

/// Build the axum router with all routes and shared configuration.
pub fn build_router(config: Arc<ServerConfig>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/calledelement",
            get(handlers::called_element::get_called_element)
                .post(handlers::called_element::post_called_element),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(config))
}

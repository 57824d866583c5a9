//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use coverdesk_core::config::ServerConfig;

use crate::api;
use crate::state::AppState;

/// `*` allows any origin; anything else is taken as a single allowed origin.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::permissive().allow_origin(value),
        Err(e) => {
            warn!("Invalid CORS_ORIGIN '{}': {}, allowing any origin", origin, e);
            CorsLayer::permissive()
        }
    }
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let upload_limit = state.upload.max_bytes;

    Router::new()
        .route("/health", get(api::health))
        .route(
            "/api/upload",
            post(api::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/packages",
            get(api::packages_list).post(api::packages_create),
        )
        .route(
            "/api/packages/{id}",
            get(api::packages_get).delete(api::packages_delete),
        )
        .route("/api/search", get(api::packages_search))
        .route("/api/categories", get(api::categories_list))
        .layer(cors_layer(&server.cors_origin))
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

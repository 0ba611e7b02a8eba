//! Template API - HTTP host for the template engine
//!
//! Provides REST endpoints for:
//! - Template CRUD scoped by owner
//! - Whole-list variable saves, checked against page geometry
//! - Tag resolution and layout previews

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod repository;
pub mod state;

pub use state::AppState;

/// Build the router over shared state
pub fn app(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Template endpoints
        .route(
            "/api/templates",
            get(handlers::list_templates).post(handlers::create_template),
        )
        .route(
            "/api/templates/:id",
            get(handlers::get_template).delete(handlers::delete_template),
        )
        .route("/api/templates/:id/variables", put(handlers::save_variables))
        .route("/api/templates/:id/preview", post(handlers::preview_template))
        // Catalog and free-text resolution
        .route("/api/catalog", get(handlers::get_catalog))
        .route("/api/resolve", post(handlers::resolve_text))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

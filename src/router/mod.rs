//! Routing module for the cart service

use crate::cart::state::SharedState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use axum::Router;

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: CORS (Permissive for local dev)
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(crate::graphql::routes())
        .merge(crate::cart::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

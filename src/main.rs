use cart_core::cart::AppState;
use cart_core::config::{init_tracing, load_config};
use cart_core::router::create_app_router;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level, config.log_json);

    // Initialize application state
    let state = Arc::new(AppState::from_config(&config));

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Server running on http://{}", addr);
    info!("GraphQL endpoint at http://{}/graphql", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}

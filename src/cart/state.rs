//! Shopping Cart State Management
//!
//! Wires the cart manager to its collaborators and exposes it to the HTTP
//! layer.

use std::sync::Arc;

use tracing::info;

use super::service::CartService;
use crate::config::AppConfig;
use crate::store::{
    JsonlOrderLedger, MemoryCartStore, MemoryOrderLedger, MemoryProductCatalog, OrderLedger,
};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state
pub struct AppState {
    /// The cart manager every route goes through
    pub carts: CartService,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// In-memory state with the demo catalog and the default policy
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    /// Builds state from configuration. Carts and products always live in
    /// memory; the ledger is durable when a path is configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = if config.seed_demo_products {
            MemoryProductCatalog::with_demo_products()
        } else {
            MemoryProductCatalog::new()
        };

        let ledger: Arc<dyn OrderLedger> = match &config.order_ledger_path {
            Some(path) => Arc::new(JsonlOrderLedger::new(path)),
            None => {
                info!("Using in-memory order ledger");
                Arc::new(MemoryOrderLedger::new())
            }
        };

        Self::with_service(CartService::new(
            Arc::new(MemoryCartStore::new()),
            Arc::new(catalog),
            ledger,
            config.policy(),
        ))
    }

    pub fn with_service(carts: CartService) -> Self {
        Self { carts }
    }
}

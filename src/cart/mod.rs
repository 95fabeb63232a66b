//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (Cart, CartLine, Product, Order, envelopes)
//! - Business logic helpers (totals, merging, lookup)
//! - The cart manager service and its mutation protocol
//! - Application state wiring
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod service;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use service::{CartPolicy, CartService};
pub use state::{AppState, SharedState};

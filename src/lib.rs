//! Cart Core Library
//!
//! This library provides the cart aggregate of the storefront: per-user carts,
//! line and selection mutations, and checkout into an order ledger, exposed
//! over a GraphQL-shaped endpoint and REST routes.

// Domain modules
pub mod cart;
pub mod graphql;

// Infrastructure
pub mod config;
pub mod error;
pub mod router;
pub mod store;

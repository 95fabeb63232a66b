//! GraphQL-shaped Cart Contract
//!
//! This module exposes the cart operations under their GraphQL names:
//! - Contract models (operation names, variables, schema text)
//! - Response helpers (data/errors envelopes)
//! - The `/graphql` handler and operation dispatch

pub mod handlers;
pub mod helpers;
pub mod models;

// Re-export commonly used types and functions
pub use handlers::{execute_operation, routes};

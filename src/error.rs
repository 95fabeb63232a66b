//! Error types for the cart core
//!
//! `StoreError` covers the collaborators (cart documents, product catalog,
//! order ledger). `CartError` is what cart operations return; it knows how
//! to present itself inside a response envelope.

use axum::http::StatusCode;
use thiserror::Error;

/// Failures raised by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The cart document changed (or vanished) since it was loaded.
    #[error("Version conflict on cart for user {user_id}: expected {expected}")]
    VersionConflict { user_id: String, expected: u64 },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of a cart operation.
///
/// The `Display` text of the domain variants is the `error` field of the
/// response envelope, so it must stay stable for clients.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product with ID {0} does not exist")]
    ProductNotFound(String),

    #[error("Item with ID {0} not found")]
    ItemNotFound(String),

    #[error("Quantity must be at least 1")]
    InvalidQuantity(i64),

    #[error("Only {available} items available")]
    InsufficientStock { product_id: String, available: u32 },

    #[error("Please select items to checkout")]
    EmptySelection,

    #[error("One or more items do not exist in cart")]
    InvalidSelection(Vec<String>),

    #[error("Cart for user {0} is under contention, gave up after retries")]
    Contention(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Text shown to callers in place of any system-class failure.
pub const SYSTEM_ERROR_TEXT: &str = "An unexpected error occurred";

impl CartError {
    /// Short summary used as the envelope `message`.
    pub fn summary(&self) -> &'static str {
        match self {
            CartError::ProductNotFound(_) => "Product not found",
            CartError::ItemNotFound(_) => "Item not found in cart",
            CartError::InvalidQuantity(_) => "Invalid quantity",
            CartError::InsufficientStock { .. } => "Insufficient stock",
            CartError::EmptySelection => "No items selected for checkout",
            CartError::InvalidSelection(_) => "Some items not found in cart",
            CartError::Contention(_) | CartError::Store(_) => "Internal server error",
        }
    }

    /// Unexpected backend failures, as opposed to caller misuse.
    pub fn is_system(&self) -> bool {
        matches!(self, CartError::Contention(_) | CartError::Store(_))
    }

    /// Text for the envelope `error` field; system details are withheld.
    pub fn public_detail(&self) -> String {
        if self.is_system() {
            SYSTEM_ERROR_TEXT.to_string()
        } else {
            self.to_string()
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CartError::ProductNotFound(_) | CartError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            CartError::InvalidQuantity(_) | CartError::EmptySelection => StatusCode::BAD_REQUEST,
            CartError::InsufficientStock { .. } | CartError::InvalidSelection(_) => {
                StatusCode::CONFLICT
            }
            CartError::Contention(_) | CartError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

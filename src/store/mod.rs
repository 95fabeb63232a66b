//! Collaborator seams for the cart core
//!
//! The cart manager never reaches for process-wide state; it is handed a
//! cart document store, a product catalog and an order ledger.

use async_trait::async_trait;

use crate::cart::models::{Cart, Order, Product};
use crate::error::StoreError;

pub mod ledger;
pub mod memory;

pub use ledger::JsonlOrderLedger;
pub use memory::{MemoryCartStore, MemoryOrderLedger, MemoryProductCatalog};

/// Keyed cart documents with compare-and-swap saves.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Cart>, StoreError>;

    /// Inserts an empty cart unless one already exists, and returns whichever
    /// cart is stored afterwards.
    async fn create(&self, user_id: &str) -> Result<Cart, StoreError>;

    /// Stores `cart` if the stored version still equals `expected_version`,
    /// returning the saved cart with its bumped version.
    async fn save(&self, cart: Cart, expected_version: u64) -> Result<Cart, StoreError>;
}

/// Read access to products plus the one counter the cart is allowed to move.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_by_id(&self, product_id: &str) -> Result<Option<Product>, StoreError>;

    /// Atomically adds `by` to the product's buyer count.
    async fn increment_buyer_count(&self, product_id: &str, by: u64) -> Result<(), StoreError>;
}

/// Append-only sink for completed orders.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn append(&self, order: &Order) -> Result<(), StoreError>;
}

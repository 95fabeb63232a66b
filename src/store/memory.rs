//! In-memory collaborators backed by `DashMap`
//!
//! Used by tests and by the demo server when no durable backend is
//! configured.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CartStore, OrderLedger, ProductCatalog};
use crate::cart::models::{Cart, Order, Product};
use crate::error::StoreError;

// =============================================================================
// Cart Store
// =============================================================================

/// Cart documents keyed by user id.
#[derive(Default)]
pub struct MemoryCartStore {
    carts: DashMap<String, Cart>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn get(&self, user_id: &str) -> Result<Option<Cart>, StoreError> {
        Ok(self.carts.get(user_id).map(|c| c.clone()))
    }

    async fn create(&self, user_id: &str) -> Result<Cart, StoreError> {
        let cart = self
            .carts
            .entry(user_id.to_string())
            .or_insert_with(|| Cart::empty(user_id));
        Ok(cart.clone())
    }

    async fn save(&self, mut cart: Cart, expected_version: u64) -> Result<Cart, StoreError> {
        // The entry guard holds the shard lock, so check and write are atomic.
        match self.carts.entry(cart.user_id.clone()) {
            Entry::Occupied(mut stored) if stored.get().version == expected_version => {
                cart.version = expected_version + 1;
                stored.insert(cart.clone());
                Ok(cart)
            }
            Entry::Occupied(stored) => {
                debug!(
                    user_id = %cart.user_id,
                    expected_version,
                    stored_version = stored.get().version,
                    "stale cart save rejected"
                );
                Err(StoreError::VersionConflict {
                    user_id: cart.user_id,
                    expected: expected_version,
                })
            }
            Entry::Vacant(_) => Err(StoreError::VersionConflict {
                user_id: cart.user_id,
                expected: expected_version,
            }),
        }
    }
}

// =============================================================================
// Product Catalog
// =============================================================================

/// Products keyed by id.
#[derive(Default)]
pub struct MemoryProductCatalog {
    products: DashMap<String, Product>,
}

impl MemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the demo products.
    pub fn with_demo_products() -> Self {
        let catalog = Self::new();
        for product in demo_products() {
            catalog.insert(product);
        }
        catalog
    }

    pub fn insert(&self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn get(&self, product_id: &str) -> Option<Product> {
        self.products.get(product_id).map(|p| p.clone())
    }
}

#[async_trait]
impl ProductCatalog for MemoryProductCatalog {
    async fn find_by_id(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.get(product_id))
    }

    async fn increment_buyer_count(&self, product_id: &str, by: u64) -> Result<(), StoreError> {
        // Missing products are a no-op, like an update matching no document.
        if let Some(mut product) = self.products.get_mut(product_id) {
            product.buyer_count = product.buyer_count.saturating_add(by);
        }
        Ok(())
    }
}

fn demo_product(id: &str, name: &str, description: &str, cents: i64, stock: u32) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        price: Decimal::new(cents, 2),
        image: Some(format!(
            "https://via.placeholder.com/300x300?text={}",
            name.split_whitespace().next().unwrap_or(name)
        )),
        stock,
        category: None,
        tags: Vec::new(),
        buyer_count: 0,
        comment_count: 0,
        views: 0,
        rating: 0.0,
    }
}

/// The sample products the demo storefront ships with.
pub fn demo_products() -> Vec<Product> {
    vec![
        demo_product("1", "Laptop", "High-performance laptop", 99_999, 50),
        demo_product("2", "Mouse", "Wireless mouse", 2_999, 200),
        demo_product("3", "Keyboard", "Mechanical keyboard", 7_999, 150),
        demo_product("4", "Monitor", "27\" 4K monitor", 44_999, 30),
        demo_product("5", "USB-C Cable", "High-speed USB-C cable", 999, 500),
    ]
}

// =============================================================================
// Order Ledger
// =============================================================================

#[derive(Default)]
pub struct MemoryOrderLedger {
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every appended order, oldest first.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl OrderLedger for MemoryOrderLedger {
    async fn append(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }
}

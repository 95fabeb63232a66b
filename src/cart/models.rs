//! Shopping Cart Domain Models
//!
//! This module contains the cart aggregate, the entities it references, the
//! operation inputs and the response envelopes returned to callers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::helpers::calculate_total;
use crate::error::CartError;

// =============================================================================
// Cart Domain Models
// =============================================================================

/// One product's quantity and unit price within a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Line identifier, unique within its cart
    pub id: String,

    /// Referenced product
    pub product_id: String,

    /// Always at least 1
    pub quantity: u32,

    /// Unit price captured when the line was added or last merged
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Per-user cart document.
///
/// `version` is bumped by the store on every successful save and is the
/// compare-and-swap token for concurrent writers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartLine>,
    /// Ids of lines marked for checkout; always a subset of `items` ids
    pub selected_items: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Cart {
    /// Creates an empty cart for `user_id`.
    pub fn empty(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: format!("cart-{}", user_id),
            user_id: user_id.to_string(),
            items: Vec::new(),
            selected_items: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.items.iter().find(|line| line.id == item_id)
    }

    pub fn is_selected(&self, item_id: &str) -> bool {
        self.selected_items.iter().any(|id| id == item_id)
    }

    /// Lines whose id is in the selection set, in cart order.
    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .filter(|line| self.is_selected(&line.id))
            .cloned()
            .collect()
    }

    pub fn total(&self) -> Decimal {
        calculate_total(&self.items)
    }

    pub fn selected_total(&self) -> Decimal {
        calculate_total(&self.selected_lines())
    }
}

/// Wire representation of a cart, with the derived total.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub selected_items: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let total = cart.total();
        Self {
            id: cart.id,
            user_id: cart.user_id,
            items: cart.items,
            total,
            selected_items: cart.selected_items,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

/// Catalog entry referenced by cart lines. The cart only ever touches
/// `buyer_count`, and only through the catalog's atomic increment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub stock: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub buyer_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub rating: f32,
}

/// Status of a completed checkout; the core only ever writes `Completed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
}

/// Immutable record of a checkout, appended to the order ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<CartLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Operation Inputs
// =============================================================================

/// Input for addItemToCart. Quantity is signed so that bad values reach
/// validation instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemInput {
    pub product_id: String,
    pub quantity: i64,
}

/// Input for updateCartItem
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemInput {
    pub item_id: String,
    pub quantity: i64,
}

/// Input for selectItems
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectItemsInput {
    pub item_ids: Vec<String>,
}

/// Body for the REST quantity update, where the item id comes from the path
#[derive(Debug, Clone, Deserialize)]
pub struct QuantityInput {
    pub quantity: i64,
}

// =============================================================================
// Response Envelopes
// =============================================================================

/// Envelope returned by every cart mutation except checkout.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<CartView>,
    pub error: Option<String>,
}

impl CartResponse {
    pub fn ok(message: &str, cart: Cart) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(cart.into()),
            error: None,
        }
    }

    pub fn failure(err: &CartError) -> Self {
        log_system_failure(err);
        Self {
            success: false,
            message: err.summary().to_string(),
            data: None,
            error: Some(err.public_detail()),
        }
    }

    /// Builds the envelope for `result`, using `message` on success.
    pub fn from_result(message: &str, result: Result<Cart, CartError>) -> Self {
        match result {
            Ok(cart) => Self::ok(message, cart),
            Err(err) => Self::failure(&err),
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderResult {
    pub order_id: String,
    pub total: Decimal,
    pub items: Vec<CartLine>,
}

/// Envelope returned by checkout.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: String,
    pub order_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
    pub items: Option<Vec<CartLine>>,
    pub error: Option<String>,
}

impl CheckoutResponse {
    pub fn from_result(result: Result<OrderResult, CartError>) -> Self {
        match result {
            Ok(order) => Self {
                success: true,
                message: "Checkout successful".to_string(),
                order_id: Some(order.order_id),
                total: Some(order.total),
                items: Some(order.items),
                error: None,
            },
            Err(err) => {
                log_system_failure(&err);
                Self {
                    success: false,
                    message: err.summary().to_string(),
                    order_id: None,
                    total: None,
                    items: None,
                    error: Some(err.public_detail()),
                }
            }
        }
    }
}

/// System failures are logged here, at the envelope boundary, since the
/// caller only ever sees the generic text.
pub fn log_system_failure(err: &CartError) {
    if err.is_system() {
        error!(error = %err, "cart operation failed");
    }
}

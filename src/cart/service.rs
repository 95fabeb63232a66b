//! Cart aggregate manager
//!
//! Every write is a read-modify-write on one cart document, committed with a
//! compare-and-swap on `Cart::version` and retried on conflict. Product
//! counters and the order ledger are touched only after the cart commit.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument, warn};

use super::helpers::{
    calculate_total, distinct_product_ids, find_line_index, format_item_summary,
    generate_order_id, merge_line,
};
use super::models::{
    AddItemInput, Cart, CartLine, Order, OrderResult, OrderStatus, Product, SelectItemsInput,
    UpdateItemInput,
};
use crate::error::{CartError, StoreError};
use crate::store::{CartStore, OrderLedger, ProductCatalog};

/// Tunables for the cart manager.
#[derive(Debug, Clone)]
pub struct CartPolicy {
    /// Compare-and-swap attempts per mutation before giving up
    pub max_mutation_retries: u32,

    /// Whether clearing a cart bumps the buyer count of its products
    pub count_cleared_as_purchase: bool,
}

impl Default for CartPolicy {
    fn default() -> Self {
        Self {
            max_mutation_retries: 16,
            count_cleared_as_purchase: true,
        }
    }
}

/// Single authority for reading and mutating carts.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn ProductCatalog>,
    ledger: Arc<dyn OrderLedger>,
    policy: CartPolicy,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn ProductCatalog>,
        ledger: Arc<dyn OrderLedger>,
        policy: CartPolicy,
    ) -> Self {
        Self {
            carts,
            catalog,
            ledger,
            policy,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the user's cart, creating an empty one on first access.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: &str) -> Result<Cart, CartError> {
        self.load_or_create(user_id).await
    }

    pub async fn get_cart_item(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<CartLine>, CartError> {
        let cart = self.load_or_create(user_id).await?;
        Ok(cart.line(item_id).cloned())
    }

    pub async fn get_selected_items(&self, user_id: &str) -> Result<Vec<CartLine>, CartError> {
        Ok(self.load_or_create(user_id).await?.selected_lines())
    }

    pub async fn get_cart_total(&self, user_id: &str) -> Result<Decimal, CartError> {
        Ok(self.load_or_create(user_id).await?.total())
    }

    pub async fn get_selected_total(&self, user_id: &str) -> Result<Decimal, CartError> {
        Ok(self.load_or_create(user_id).await?.selected_total())
    }

    // =========================================================================
    // Line Mutations
    // =========================================================================

    /// Adds `quantity` units of a product, merging into an existing line.
    #[instrument(
        skip(self, input),
        fields(product_id = %input.product_id, quantity = input.quantity)
    )]
    pub async fn add_item_to_cart(
        &self,
        user_id: &str,
        input: AddItemInput,
    ) -> Result<Cart, CartError> {
        let quantity = positive_quantity(input.quantity)?;
        let product = self
            .catalog
            .find_by_id(&input.product_id)
            .await?
            .ok_or_else(|| CartError::ProductNotFound(input.product_id.clone()))?;

        let (cart, ()) = self
            .mutate(user_id, |cart| {
                let mut items = cart.items.clone();
                let index = merge_line(&mut items, &product, quantity);
                ensure_in_stock(&product, items[index].quantity)?;
                cart.items = items;
                Ok(())
            })
            .await?;

        info!(user_id, product_id = %product.id, quantity, "item added to cart");
        Ok(cart)
    }

    /// Sets a line's quantity exactly.
    #[instrument(skip(self, input), fields(item_id = %input.item_id, quantity = input.quantity))]
    pub async fn update_cart_item(
        &self,
        user_id: &str,
        input: UpdateItemInput,
    ) -> Result<Cart, CartError> {
        let current = self.load_or_create(user_id).await?;
        let line = current
            .line(&input.item_id)
            .ok_or_else(|| CartError::ItemNotFound(input.item_id.clone()))?;
        let quantity = positive_quantity(input.quantity)?;
        let product = self.catalog.find_by_id(&line.product_id).await?;

        let (cart, ()) = self
            .mutate(user_id, |cart| {
                let line = cart
                    .items
                    .iter_mut()
                    .find(|l| l.id == input.item_id)
                    .ok_or_else(|| CartError::ItemNotFound(input.item_id.clone()))?;
                if let Some(product) = &product {
                    ensure_in_stock(product, quantity)?;
                }
                line.quantity = quantity;
                Ok(())
            })
            .await?;

        info!(user_id, item_id = %input.item_id, quantity, "cart item updated");
        Ok(cart)
    }

    /// Removes a line, addressed by line id or by product id.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, user_id: &str, item_id: &str) -> Result<Cart, CartError> {
        let (cart, removed) = self
            .mutate(user_id, |cart| {
                let index = find_line_index(&cart.items, item_id)
                    .ok_or_else(|| CartError::ItemNotFound(item_id.to_string()))?;
                let removed = cart.items.remove(index);
                cart.selected_items.retain(|id| *id != removed.id);
                Ok(removed)
            })
            .await?;

        info!(
            user_id,
            item_id = %removed.id,
            product_id = %removed.product_id,
            "item removed from cart"
        );
        Ok(cart)
    }

    /// Empties the cart. When the policy says so, each distinct product's
    /// buyer count is bumped once the cart is committed.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: &str) -> Result<Cart, CartError> {
        let (cart, cleared) = self
            .mutate(user_id, |cart| {
                let cleared = std::mem::take(&mut cart.items);
                cart.selected_items.clear();
                Ok(cleared)
            })
            .await?;

        info!(user_id, lines = cleared.len(), "cart cleared");
        if self.policy.count_cleared_as_purchase {
            self.bump_buyer_counts(&distinct_product_ids(&cleared)).await;
        }
        Ok(cart)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Replaces the selection set. Unknown ids reject the whole request.
    #[instrument(skip(self, input))]
    pub async fn select_items(
        &self,
        user_id: &str,
        input: SelectItemsInput,
    ) -> Result<Cart, CartError> {
        let (cart, ()) = self
            .mutate(user_id, |cart| {
                let unknown: Vec<String> = input
                    .item_ids
                    .iter()
                    .filter(|id| cart.line(id).is_none())
                    .cloned()
                    .collect();
                if !unknown.is_empty() {
                    return Err(CartError::InvalidSelection(unknown));
                }

                let mut selected: Vec<String> = Vec::with_capacity(input.item_ids.len());
                for id in &input.item_ids {
                    if !selected.contains(id) {
                        selected.push(id.clone());
                    }
                }
                cart.selected_items = selected;
                Ok(())
            })
            .await?;

        debug!(user_id, selected = cart.selected_items.len(), "selection replaced");
        Ok(cart)
    }

    pub async fn select_all_items(&self, user_id: &str) -> Result<Cart, CartError> {
        let (cart, ()) = self
            .mutate(user_id, |cart| {
                cart.selected_items = cart.items.iter().map(|l| l.id.clone()).collect();
                Ok(())
            })
            .await?;
        Ok(cart)
    }

    pub async fn clear_selected_items(&self, user_id: &str) -> Result<Cart, CartError> {
        let (cart, ()) = self
            .mutate(user_id, |cart| {
                cart.selected_items.clear();
                Ok(())
            })
            .await?;
        Ok(cart)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Turns the selected lines into an order.
    ///
    /// Ordering contract:
    /// 1. The cart is committed with the selected lines removed. A conflict
    ///    retries this step only, so nothing downstream runs twice.
    /// 2. The order is appended to the ledger. If that fails the lines are
    ///    merged back and re-selected, and a system error is returned.
    /// 3. Buyer counts are bumped. Failures are logged and swallowed, so the
    ///    counters may under-count completed orders.
    #[instrument(skip(self))]
    pub async fn checkout(&self, user_id: &str) -> Result<OrderResult, CartError> {
        let (_, purchased) = self
            .mutate(user_id, |cart| {
                let selected = cart.selected_lines();
                if selected.is_empty() {
                    return Err(CartError::EmptySelection);
                }
                let selected_ids = std::mem::take(&mut cart.selected_items);
                cart.items.retain(|l| !selected_ids.contains(&l.id));
                Ok(selected)
            })
            .await?;

        let order = Order {
            order_id: generate_order_id(),
            user_id: user_id.to_string(),
            total: calculate_total(&purchased),
            items: purchased,
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        };

        if let Err(err) = self.ledger.append(&order).await {
            error!(
                user_id,
                order_id = %order.order_id,
                error = %err,
                "order ledger append failed, restoring cart lines"
            );
            self.restore_lines(user_id, &order.items).await;
            return Err(err.into());
        }

        info!(
            user_id,
            order_id = %order.order_id,
            total = %order.total,
            "checkout completed: {}",
            format_item_summary(&order.items)
        );

        self.bump_buyer_counts(&distinct_product_ids(&order.items)).await;

        Ok(OrderResult {
            order_id: order.order_id,
            total: order.total,
            items: order.items,
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn load_or_create(&self, user_id: &str) -> Result<Cart, CartError> {
        match self.carts.get(user_id).await? {
            Some(cart) => Ok(cart),
            None => Ok(self.carts.create(user_id).await?),
        }
    }

    /// Applies `apply` to a fresh copy of the user's cart and commits it.
    ///
    /// `apply` may run several times; an `Err` from it aborts without saving.
    async fn mutate<T, F>(&self, user_id: &str, mut apply: F) -> Result<(Cart, T), CartError>
    where
        F: FnMut(&mut Cart) -> Result<T, CartError> + Send,
        T: Send,
    {
        let attempts = self.policy.max_mutation_retries.max(1);
        for attempt in 1..=attempts {
            let mut cart = self.load_or_create(user_id).await?;
            let expected = cart.version;
            let output = apply(&mut cart)?;
            cart.updated_at = Utc::now();

            match self.carts.save(cart, expected).await {
                Ok(saved) => return Ok((saved, output)),
                Err(StoreError::VersionConflict { .. }) => {
                    debug!(user_id, attempt, "cart changed underneath, retrying");
                    tokio::task::yield_now().await;
                }
                Err(err) => return Err(err.into()),
            }
        }

        warn!(user_id, attempts, "cart mutation abandoned after repeated conflicts");
        Err(CartError::Contention(user_id.to_string()))
    }

    /// Puts checked-out lines back after a failed ledger append.
    async fn restore_lines(&self, user_id: &str, lines: &[CartLine]) {
        let restored = self
            .mutate(user_id, |cart| {
                for line in lines {
                    let id = match cart.items.iter_mut().find(|l| l.product_id == line.product_id) {
                        Some(existing) => {
                            existing.quantity = existing.quantity.saturating_add(line.quantity);
                            existing.id.clone()
                        }
                        None => {
                            cart.items.push(line.clone());
                            line.id.clone()
                        }
                    };
                    if !cart.is_selected(&id) {
                        cart.selected_items.push(id);
                    }
                }
                Ok(())
            })
            .await;

        if let Err(err) = restored {
            error!(
                user_id,
                error = %err,
                lines = %format_item_summary(lines),
                "could not restore cart after failed checkout, manual reconciliation needed"
            );
        }
    }

    async fn bump_buyer_counts(&self, product_ids: &[String]) {
        let results = join_all(
            product_ids
                .iter()
                .map(|id| self.catalog.increment_buyer_count(id, 1)),
        )
        .await;

        for (product_id, result) in product_ids.iter().zip(results) {
            if let Err(err) = result {
                warn!(%product_id, error = %err, "buyer count increment failed");
            }
        }
    }
}

/// Rejects quantities below 1. Values past `u32::MAX` saturate and are left
/// to the stock check.
fn positive_quantity(quantity: i64) -> Result<u32, CartError> {
    if quantity < 1 {
        return Err(CartError::InvalidQuantity(quantity));
    }
    Ok(u32::try_from(quantity).unwrap_or(u32::MAX))
}

fn ensure_in_stock(product: &Product, quantity: u32) -> Result<(), CartError> {
    if quantity > product.stock {
        return Err(CartError::InsufficientStock {
            product_id: product.id.clone(),
            available: product.stock,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(matches!(positive_quantity(0), Err(CartError::InvalidQuantity(0))));
        assert!(matches!(positive_quantity(-3), Err(CartError::InvalidQuantity(-3))));
        assert_eq!(positive_quantity(5_000_000_000).unwrap(), u32::MAX);
        assert_eq!(positive_quantity(i64::MAX).unwrap(), u32::MAX);
        assert_eq!(positive_quantity(7).unwrap(), 7);
    }
}

//! Shopping Cart Business Logic Helpers
//!
//! Pure functions over cart lines: totals, merging, lookup and id
//! generation. Nothing here touches a store.

use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde_json::Value;
use uuid::Uuid;

use super::models::{CartLine, Product};

/// Sum of `price * quantity` over `lines`.
pub fn calculate_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// New line identifier, unique within any cart.
pub fn generate_line_id() -> String {
    format!("item-{}", Uuid::new_v4().simple())
}

/// Time-prefixed order identifier. The random suffix keeps two checkouts in
/// the same millisecond apart.
pub fn generate_order_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("order-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

/// Merges `quantity` units of `product` into `lines`.
///
/// # Behaviour
///
/// * If a line for the product already exists, its quantity grows by
///   `quantity` and its price is refreshed from the product.
/// * Otherwise a new line is appended with a price snapshot.
///
/// Returns the index of the affected line.
pub fn merge_line(lines: &mut Vec<CartLine>, product: &Product, quantity: u32) -> usize {
    if let Some(index) = lines.iter().position(|l| l.product_id == product.id) {
        let existing = &mut lines[index];
        existing.quantity = existing.quantity.saturating_add(quantity);
        existing.price = product.price;
        return index;
    }

    lines.push(CartLine {
        id: generate_line_id(),
        product_id: product.id.clone(),
        quantity,
        price: product.price,
    });
    lines.len() - 1
}

/// Finds a line by its id, falling back to the product id so callers holding
/// either identifier resolve the same line.
pub fn find_line_index(lines: &[CartLine], key: &str) -> Option<usize> {
    lines
        .iter()
        .position(|l| l.id == key)
        .or_else(|| lines.iter().position(|l| l.product_id == key))
}

/// Distinct product ids across `lines`, first occurrence first.
pub fn distinct_product_ids(lines: &[CartLine]) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .filter(|l| seen.insert(l.product_id.as_str()))
        .map(|l| l.product_id.clone())
        .collect()
}

/// Money as a plain JSON number, matching how envelopes serialise prices.
pub fn money_value(amount: Decimal) -> Value {
    amount.to_f64().map(Value::from).unwrap_or(Value::Null)
}

/// Produces a human-readable one-line summary for a list of cart lines.
///
/// Example output: `"2x 1, 1x 3"`.
pub fn format_item_summary(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}x {}", l.quantity, l.product_id))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn product(id: &str, price: Decimal) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            price,
            image: None,
            stock: 1000,
            category: None,
            tags: Vec::new(),
            buyer_count: 0,
            comment_count: 0,
            views: 0,
            rating: 0.0,
        }
    }

    #[test]
    fn merging_same_product_keeps_one_line() {
        let mut lines = Vec::new();
        let p1 = product("P1", dec!(10));
        merge_line(&mut lines, &p1, 2);
        merge_line(&mut lines, &p1, 3);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(lines[0].line_total(), dec!(50));
    }

    #[test]
    fn merging_refreshes_price() {
        let mut lines = Vec::new();
        merge_line(&mut lines, &product("P1", dec!(10)), 1);
        merge_line(&mut lines, &product("P1", dec!(12.5)), 1);

        assert_eq!(lines[0].price, dec!(12.5));
        assert_eq!(calculate_total(&lines), dec!(25));
    }

    #[test]
    fn lookup_prefers_line_id_then_product_id() {
        let mut lines = Vec::new();
        merge_line(&mut lines, &product("P1", dec!(1)), 1);
        merge_line(&mut lines, &product("P2", dec!(1)), 1);
        let second_id = lines[1].id.clone();

        assert_eq!(find_line_index(&lines, &second_id), Some(1));
        assert_eq!(find_line_index(&lines, "P1"), Some(0));
        assert_eq!(find_line_index(&lines, "missing"), None);
    }

    #[test]
    fn order_ids_are_distinct() {
        let a = generate_order_id();
        let b = generate_order_id();
        assert!(a.starts_with("order-"));
        assert_ne!(a, b);
    }

    #[test]
    fn summary_lists_quantities() {
        let mut lines = Vec::new();
        merge_line(&mut lines, &product("1", dec!(1)), 2);
        merge_line(&mut lines, &product("3", dec!(1)), 1);
        assert_eq!(format_item_summary(&lines), "2x 1, 1x 3");
    }

    proptest! {
        #[test]
        fn merged_quantity_is_sum_of_adds(
            quantities in proptest::collection::vec(1u32..1000, 1..20)
        ) {
            let p = product("P", dec!(3.25));
            let mut lines = Vec::new();
            for q in &quantities {
                merge_line(&mut lines, &p, *q);
            }
            prop_assert_eq!(lines.len(), 1);
            prop_assert_eq!(lines[0].quantity, quantities.iter().sum::<u32>());
        }

        #[test]
        fn total_matches_line_sum(
            adds in proptest::collection::vec((0usize..5, 1u32..50, 0u32..10_000), 0..30)
        ) {
            let mut lines = Vec::new();
            for (pid, qty, cents) in &adds {
                let p = product(&format!("P{}", pid), Decimal::new(*cents as i64, 2));
                merge_line(&mut lines, &p, *qty);
            }
            let expected: Decimal = lines
                .iter()
                .map(|l| l.price * Decimal::from(l.quantity))
                .sum();
            prop_assert_eq!(calculate_total(&lines), expected);
            prop_assert_eq!(distinct_product_ids(&lines).len(), lines.len());
        }
    }
}

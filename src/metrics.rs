//! Cart Metrics
//!
//! Aggregate figures derived from a cart once per evaluation: total value,
//! total item count and the set of distinct categories present.

use rusty_money::{Money, iso::Currency};

use crate::{carts::Cart, categories::CategorySet};

/// Aggregates computed from a cart's line items.
///
/// Computed once per evaluation and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CartMetrics<'a> {
    cart_value: Money<'a, Currency>,
    total_items: u64,
    categories: CategorySet,
}

impl<'a> CartMetrics<'a> {
    /// Total value of the cart: Σ(unit price × quantity).
    pub fn cart_value(&self) -> &Money<'a, Currency> {
        &self.cart_value
    }

    /// Total number of items: Σ(quantity).
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Distinct categories present in the cart.
    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }
}

impl<'a> Cart<'a> {
    /// Reduce the cart's line items into aggregate metrics.
    ///
    /// An empty cart yields a zero value, a zero item count and an empty
    /// category set.
    pub fn metrics(&self) -> CartMetrics<'a> {
        let mut value_minor = 0_i64;
        let mut total_items = 0_u64;
        let mut categories = CategorySet::empty();

        for item in self.items() {
            value_minor += item.unit_price().to_minor_units() * i64::from(item.quantity());
            total_items += u64::from(item.quantity());

            if let Some(category) = item.category()
                && !category.is_empty()
            {
                categories.add(category);
            }
        }

        CartMetrics {
            cart_value: Money::from_minor(value_minor, self.currency()),
            total_items,
            categories,
        }
    }
}

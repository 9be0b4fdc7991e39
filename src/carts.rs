//! Carts
//!
//! A cart is an ordered sequence of line items in a single currency. Carts
//! are supplied per evaluation and never persisted.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors related to cart construction.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line item was given a zero quantity (index).
    #[error("Item {0} has a zero quantity")]
    ZeroQuantity(usize),

    /// A line item was given a negative unit price (index).
    #[error("Item {0} has a negative unit price")]
    NegativePrice(usize),
}

/// A single cart line item.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem<'a> {
    unit_price: Money<'a, Currency>,
    quantity: u32,
    category: Option<String>,
}

impl<'a> CartItem<'a> {
    /// Create a line item without a category label.
    pub fn new(unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
            category: None,
        }
    }

    /// Create a line item with a category label.
    pub fn with_category(
        unit_price: Money<'a, Currency>,
        quantity: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            unit_price,
            quantity,
            category: Some(category.into()),
        }
    }

    /// Returns the unit price of the item.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the quantity of the item.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the category label of the item, if any.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    items: Vec<CartItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given line items.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if an item's currency differs from the cart
    /// currency, an item has a zero quantity, or a unit price is negative.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.unit_price().currency();
            if item_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if item.quantity() == 0 {
                return Err(CartError::ZeroQuantity(i));
            }

            if item.unit_price().to_minor_units() < 0 {
                return Err(CartError::NegativePrice(i));
            }

            Ok(())
        })?;

        Ok(Cart { items, currency })
    }

    /// Get the line items in the cart.
    pub fn items(&self) -> &[CartItem<'a>] {
        &self.items
    }

    /// Get the number of line items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use super::*;

    fn test_items<'a>() -> [CartItem<'a>; 2] {
        [
            CartItem::with_category(Money::from_minor(1_00, iso::USD), 2, "fashion"),
            CartItem::new(Money::from_minor(2_50, iso::USD), 1),
        ]
    }

    #[test]
    fn new_with_currency() {
        let cart = Cart::new(iso::USD);

        assert_eq!(cart.currency(), iso::USD);
        assert!(cart.is_empty());
    }

    #[test]
    fn with_items_currency_mismatch_errors() {
        let items = [
            CartItem::new(Money::from_minor(1_00, iso::USD), 1),
            CartItem::new(Money::from_minor(1_00, iso::GBP), 1),
        ];

        let result = Cart::with_items(items, iso::USD);

        match result {
            Err(CartError::CurrencyMismatch(idx, item_currency, cart_currency)) => {
                assert_eq!(idx, 1);
                assert_eq!(item_currency, iso::GBP.iso_alpha_code);
                assert_eq!(cart_currency, iso::USD.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn with_items_zero_quantity_errors() {
        let items = [CartItem::new(Money::from_minor(1_00, iso::USD), 0)];

        let result = Cart::with_items(items, iso::USD);

        assert!(matches!(result, Err(CartError::ZeroQuantity(0))));
    }

    #[test]
    fn with_items_negative_price_errors() {
        let items = [CartItem::new(Money::from_minor(-1_00, iso::USD), 1)];

        let result = Cart::with_items(items, iso::USD);

        assert!(matches!(result, Err(CartError::NegativePrice(0))));
    }

    #[test]
    fn with_items_well_formed_succeeds() -> TestResult {
        let cart = Cart::with_items(test_items(), iso::USD)?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.currency(), iso::USD);

        Ok(())
    }

    #[test]
    fn item_accessors() {
        let item = CartItem::with_category(Money::from_minor(5_00, iso::USD), 3, "toys");

        assert_eq!(item.unit_price(), &Money::from_minor(5_00, iso::USD));
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.category(), Some("toys"));

        let bare = CartItem::new(Money::from_minor(5_00, iso::USD), 1);
        assert_eq!(bare.category(), None);
    }
}

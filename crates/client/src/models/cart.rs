//! Cart aggregate.
//!
//! The cart is an ordered collection of [`CartItem`] keyed by product
//! identity. The same in-memory shape backs both modes: in guest mode it is
//! flushed to the local store after every mutation, in remote mode it is a
//! cache of the backend cart (and the fallback target when a remote mutation
//! fails).

use serde::{Deserialize, Serialize};

use mercado_core::{CurrencyCode, Price, ProductId};

/// Minimal product projection the cart carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Backend product ID.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Optional product image.
    pub image_url: Option<String>,
}

/// One cart line: a product and how many of it.
///
/// Invariant: `quantity >= 1`. A quantity reaching zero deletes the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product in this line.
    pub product: ProductRef,
    /// Units of the product, always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Line total (unit price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Ordered collection of cart lines, unique per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from lines, merging duplicate products.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item.product, item.quantity);
        }
        cart
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` units of `product`, clamped to at least 1.
    ///
    /// An existing line for the same product is incremented in place;
    /// insertion order is preserved.
    pub fn add(&mut self, product: ProductRef, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity = item.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem { product, quantity });
        }
    }

    /// Remove the line for `product_id`, if present.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|i| i.product.id != product_id);
    }

    /// Set the quantity for `product_id`.
    ///
    /// A quantity of zero removes the line. Setting a quantity for a product
    /// not in the cart is a no-op (there is no product data to add a line
    /// from).
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Cart total.
    ///
    /// Uses the currency of the first line; a line in a different currency is
    /// skipped and logged, since a single backend cart never mixes
    /// currencies.
    #[must_use]
    pub fn total(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or(CurrencyCode::default(), |i| i.product.price.currency_code);

        self.items
            .iter()
            .fold(Price::zero(currency), |acc, item| {
                acc.checked_add(&item.line_total()).unwrap_or_else(|| {
                    tracing::warn!(
                        product_id = %item.product.id,
                        "skipping cart line with mismatched currency"
                    );
                    acc
                })
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(id: i64, cents: i64) -> ProductRef {
        ProductRef {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::COP),
            image_url: None,
        }
    }

    #[test]
    fn test_add_clamps_quantity_to_one() {
        let mut cart = Cart::new();
        cart.add(product(1, 1000), 0);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_add_same_product_increments() {
        let mut cart = Cart::new();
        cart.add(product(1, 1000), 2);
        cart.add(product(1, 1000), 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add(product(1, 1000), 2);
        cart.set_quantity(ProductId::new(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.add(product(1, 1000), 2);
        cart.set_quantity(ProductId::new(99), 5);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_item_count_is_sum_of_quantities() {
        let mut cart = Cart::new();
        cart.add(product(1, 1000), 2);
        cart.add(product(2, 500), 3);
        cart.add(product(3, 250), 1);
        cart.remove(ProductId::new(3));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_total() {
        let mut cart = Cart::new();
        cart.add(product(1, 1000), 2); // 20.00
        cart.add(product(2, 550), 1); // 5.50
        assert_eq!(cart.total().amount, Decimal::new(2550, 2));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.add(product(3, 100), 1);
        cart.add(product(1, 100), 1);
        cart.add(product(2, 100), 1);
        let ids: Vec<i64> = cart.items().iter().map(|i| i.product.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_from_items_merges_duplicates() {
        let cart = Cart::from_items(vec![
            CartItem {
                product: product(1, 100),
                quantity: 1,
            },
            CartItem {
                product: product(1, 100),
                quantity: 2,
            },
        ]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
    }
}

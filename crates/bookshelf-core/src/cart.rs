//! # Cart
//!
//! The shopping cart: line items, quantity management and discount pricing.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Presentation Gesture     Cart Method               Cart Change         │
//! │  ────────────────────     ───────────               ───────────         │
//! │                                                                         │
//! │  Tap "add" on a book ───► add_item() ─────────────► qty + 1 or new line │
//! │                                                                         │
//! │  Tap "+" / "-" ─────────► update_quantity(n) ─────► qty = n             │
//! │                                  │                                      │
//! │                                  └── n < 1 ───────► line removed        │
//! │                                                                         │
//! │  Swipe to delete ───────► remove_item() ──────────► line removed        │
//! │                                                                         │
//! │  Cart footer ───────────► total() ────────────────► (read only)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these operations can fail. Unknown ids are ignored and a
//! quantity below one removes the line, so the invariant "every line has
//! quantity >= 1" holds after every call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CatalogItem, Discount};

// =============================================================================
// Pricing
// =============================================================================

/// Unit price after an optional percentage discount.
///
/// Returns `price` unchanged when the discount is absent or zero, otherwise
/// `price * (1 - pct / 100)` rounded to the cent.
///
/// ```rust
/// use bookshelf_core::cart::discounted_unit_price;
/// use bookshelf_core::money::Money;
/// use bookshelf_core::types::Discount;
///
/// let price = Money::from_cents(10000);
/// assert_eq!(discounted_unit_price(price, None), price);
/// assert_eq!(discounted_unit_price(price, Some(Discount::zero())), price);
/// assert_eq!(discounted_unit_price(price, Some(Discount::from_percentage(20.0))).cents(), 8000);
/// ```
#[inline]
pub fn discounted_unit_price(price: Money, discount: Option<Discount>) -> Money {
    match discount {
        Some(discount) => price.apply_discount(discount),
        None => price,
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One catalog item's quantity and price snapshot inside the cart.
///
/// The price and discount are frozen when the item is first added, so
/// the cart keeps showing what the shopper agreed to even if the catalog
/// changes underneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Catalog item id this line refers to.
    pub item_id: String,

    /// Title at time of adding (frozen).
    pub title: String,

    /// Author at time of adding (frozen).
    pub author: String,

    /// Cover image at time of adding (frozen).
    pub image: String,

    /// Undiscounted unit price at time of adding (frozen).
    pub unit_price: Money,

    /// Discount at time of adding (frozen).
    pub discount: Option<Discount>,

    /// Always >= 1.
    pub quantity: u32,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line with quantity 1 from a catalog item.
    pub fn from_item(item: &CatalogItem) -> Self {
        CartLine {
            item_id: item.id.clone(),
            title: item.title.clone(),
            author: item.author.clone(),
            image: item.image.clone(),
            unit_price: item.price,
            discount: item.discount,
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    /// Unit price after the frozen discount.
    #[inline]
    pub fn discounted_unit_price(&self) -> Money {
        discounted_unit_price(self.unit_price, self.discount)
    }

    /// Discounted unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.discounted_unit_price().multiply_quantity(self.quantity)
    }

    /// Undiscounted unit price × quantity.
    #[inline]
    pub fn line_subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same item bumps quantity)
/// - Every line has `quantity >= 1`
/// - Lines keep the order in which items were first added
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `item`.
    ///
    /// ## Behavior
    /// - Item already in cart: quantity + 1 (snapshot is not refreshed)
    /// - Item not in cart: new line with quantity 1
    ///
    /// Returns the affected line.
    pub fn add_item(&mut self, item: &CatalogItem) -> &CartLine {
        let index = match self.position(&item.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line.quantity.saturating_add(1);
                index
            }
            None => {
                self.lines.push(CartLine::from_item(item));
                self.lines.len() - 1
            }
        };
        &self.lines[index]
    }

    /// Removes the line for `item_id`, returning it if it existed.
    pub fn remove_item(&mut self, item_id: &str) -> Option<CartLine> {
        let index = self.position(item_id)?;
        Some(self.lines.remove(index))
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `new_quantity < 1`: same as [`Cart::remove_item`]
    /// - Item not in cart: no-op
    /// - Quantities beyond `u32::MAX` saturate
    ///
    /// Returns `true` when the cart changed.
    pub fn update_quantity(&mut self, item_id: &str, new_quantity: i64) -> bool {
        if new_quantity < 1 {
            return self.remove_item(item_id).is_some();
        }

        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        match self.lines.iter_mut().find(|l| l.item_id == item_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Looks up the line for `item_id`.
    pub fn get(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities (the cart badge number).
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Total before discounts.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_subtotal).sum()
    }

    /// Amount owed: sum of discounted unit price × quantity.
    /// Zero for an empty cart.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// How much the discounts take off the subtotal.
    pub fn savings(&self) -> Money {
        self.subtotal() - self.total()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.item_id == item_id)
    }
}

/// Cart summary for the cart footer and badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: u32,
    pub total_quantity: u64,
    pub subtotal: Money,
    pub savings: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: u32::try_from(cart.item_count()).unwrap_or(u32::MAX),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            savings: cart.savings(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

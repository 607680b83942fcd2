//! # bookshelf-core: Pure Business Logic for the Bookshelf Storefront
//!
//! Cart math, discount pricing, the catalog and the checkout state machine,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bookshelf Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (mobile screen)                    │   │
//! │  │   Categories ──► Shelves ──► Cart modal ──► Checkout dialog     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ LedgerEventEmitter / ts-rs types       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          bookshelf-checkout (CartLedger, PaymentGateway)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bookshelf-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ checkout │ │catalog │  │   │
//! │  │   │Discount │ │  Money  │ │  Cart   │ │  State   │ │ Filter │  │   │
//! │  │   │Currency │ │         │ │CartLine │ │ Request  │ │ Shelf  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog items, categories, discounts, currencies
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart lines, quantity management, totals
//! - [`checkout`] - Payment payload and checkout state machine
//! - [`catalog`] - Read-only catalog and filter panel
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use bookshelf_core::{Cart, CatalogItem, Discount, Money};
//!
//! let book = CatalogItem::new("1", "El Principito", "Antoine de Saint-Exupéry", Money::from_cents(2499))
//!     .with_discount(Discount::from_percentage(15.0));
//!
//! let mut cart = Cart::new();
//! cart.add_item(&book);
//!
//! // $24.99 at 15% off
//! assert_eq!(cart.total().cents(), 2124);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{discounted_unit_price, Cart, CartLine, CartTotals};
pub use catalog::{Catalog, CatalogFilter, LanguageFilter, Shelf};
pub use checkout::{CheckoutState, OrderConfirmation, OrderLine, PaymentReceipt, PaymentRequest};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

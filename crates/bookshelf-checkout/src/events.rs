//! # Ledger Events
//!
//! Notifications the presentation layer subscribes to: the cart badge
//! bounce when an item is added, refreshed totals after every cart change,
//! and checkout state transitions (spinner, success and failure dialogs).
//!
//! ```text
//! "cart://item-added"      - CartLine
//! "cart://changed"         - CartTotals
//! "checkout://state"       - CheckoutState { status: "processing" | ... }
//! ```

use bookshelf_core::{CartLine, CartTotals, CheckoutState};

/// Receives ledger notifications. Called with no locks held.
pub trait LedgerEventEmitter: Send + Sync {
    /// An item was added (or its quantity bumped) via `add_item`.
    fn item_added(&self, line: &CartLine);

    /// Cart contents changed; `totals` reflect the new contents.
    fn cart_changed(&self, totals: &CartTotals);

    /// Checkout state moved.
    fn checkout_state_changed(&self, state: &CheckoutState);
}

/// No-op event emitter for testing and headless use.
pub struct NoOpEmitter;

impl LedgerEventEmitter for NoOpEmitter {
    fn item_added(&self, _line: &CartLine) {}
    fn cart_changed(&self, _totals: &CartTotals) {}
    fn checkout_state_changed(&self, _state: &CheckoutState) {}
}

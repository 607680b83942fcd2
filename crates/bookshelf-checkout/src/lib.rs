//! # bookshelf-checkout: Cart Ledger & Checkout
//!
//! The stateful half of the storefront. [`CartLedger`] owns the shopper's
//! cart, guards the checkout state machine and drives the asynchronous
//! payment call through a [`PaymentGateway`].
//!
//! ## Guarantees
//! - At most one checkout is in flight per ledger
//! - A failed checkout leaves the cart exactly as it was
//! - A successful checkout empties the cart
//! - Dropping an in-flight checkout returns the state to `Idle`
//!
//! ## Example Usage
//! ```rust,ignore
//! use bookshelf_checkout::{CartLedger, CheckoutConfig};
//!
//! let config = CheckoutConfig::load_or_default(None);
//! let currency = config.default_currency().clone();
//! let ledger = CartLedger::simulated(config);
//!
//! ledger.add_item(&book);
//! let confirmation = ledger.begin_checkout(currency).await?;
//! println!("Order #{}", confirmation.order_id);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod ledger;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CheckoutConfig, CheckoutSettings, PaymentSettings};
pub use error::{CheckoutError, CheckoutResult, PaymentError};
pub use events::{LedgerEventEmitter, NoOpEmitter};
pub use gateway::{PaymentGateway, SimulatedGateway};
pub use ledger::CartLedger;

pub use bookshelf_core::discounted_unit_price;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to `info,bookshelf_checkout=debug`. Safe to call more
/// than once (later calls are ignored).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bookshelf_checkout=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

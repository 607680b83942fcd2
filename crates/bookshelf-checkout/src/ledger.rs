//! # Cart Ledger
//!
//! Owns the live cart and the checkout state, and runs the asynchronous
//! payment call.
//!
//! ## Thread Safety
//! Cart and state share one `Arc<Mutex<_>>` so a checkout snapshot and the
//! `Processing` transition happen atomically. The lock is never held across
//! an `.await` or while calling the event emitter.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        begin_checkout()                                 │
//! │                                                                         │
//! │  lock ─► Processing? ──yes──► Err(AlreadyInProgress)  (no gateway call) │
//! │            │ no                                                         │
//! │            ▼                                                            │
//! │          currency supported? cart non-empty?  ──no──► Err (no change)  │
//! │            │ yes                                                        │
//! │            ▼                                                            │
//! │          snapshot PaymentRequest, state = Processing, unlock            │
//! │            │                                                            │
//! │            ▼                                                            │
//! │          gateway.charge() under timeout                                 │
//! │            │                                                            │
//! │      ┌─────┴──────┐                                                     │
//! │      ▼            ▼                                                     │
//! │   Succeeded     Failed { reason }                                       │
//! │   cart cleared  cart untouched                                          │
//! │                                                                         │
//! │  Future dropped while in flight ─► state back to Idle, cart untouched   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use bookshelf_core::{
    Cart, CartLine, CartTotals, CatalogItem, CheckoutState, Currency, Money, OrderConfirmation,
    PaymentReceipt, PaymentRequest,
};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult, PaymentError};
use crate::events::{LedgerEventEmitter, NoOpEmitter};
use crate::gateway::{PaymentGateway, SimulatedGateway};

#[derive(Debug, Default)]
struct LedgerInner {
    cart: Cart,
    state: CheckoutState,
}

/// The shopper's cart plus the checkout flow driving it.
///
/// Cheap to clone; clones share the same cart.
#[derive(Clone)]
pub struct CartLedger {
    inner: Arc<Mutex<LedgerInner>>,
    gateway: Arc<dyn PaymentGateway>,
    emitter: Arc<dyn LedgerEventEmitter>,
    config: Arc<CheckoutConfig>,
}

impl CartLedger {
    /// Creates an empty ledger in the `Idle` state.
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: CheckoutConfig) -> Self {
        CartLedger {
            inner: Arc::new(Mutex::new(LedgerInner::default())),
            gateway,
            emitter: Arc::new(NoOpEmitter),
            config: Arc::new(config),
        }
    }

    /// Ledger backed by the simulated payment provider described in `config`.
    pub fn simulated(config: CheckoutConfig) -> Self {
        let gateway = SimulatedGateway::from_config(&config.payment);
        Self::new(Arc::new(gateway), config)
    }

    /// Replaces the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn LedgerEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a closure with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let inner = self.lock();
        f(&inner.cart)
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Adds one copy of `item`, or bumps the quantity if it is already there.
    pub fn add_item(&self, item: &CatalogItem) -> CartLine {
        let (line, totals) = {
            let mut inner = self.lock();
            let line = inner.cart.add_item(item).clone();
            (line, inner.cart.totals())
        };

        debug!(item_id = %line.item_id, quantity = line.quantity, "Item added to cart");
        self.emitter.item_added(&line);
        self.emitter.cart_changed(&totals);
        line
    }

    /// Removes the line for `item_id`. Unknown ids are a no-op.
    pub fn remove_item(&self, item_id: &str) -> Option<CartLine> {
        let (removed, totals) = {
            let mut inner = self.lock();
            let removed = inner.cart.remove_item(item_id);
            (removed, inner.cart.totals())
        };

        if removed.is_some() {
            debug!(item_id = %item_id, "Item removed from cart");
            self.emitter.cart_changed(&totals);
        }
        removed
    }

    /// Sets the quantity for `item_id`; anything below 1 removes the line.
    ///
    /// Returns `true` if the cart changed.
    pub fn update_quantity(&self, item_id: &str, quantity: i64) -> bool {
        let (changed, totals) = {
            let mut inner = self.lock();
            let changed = inner.cart.update_quantity(item_id, quantity);
            (changed, inner.cart.totals())
        };

        if changed {
            debug!(item_id = %item_id, quantity, "Cart quantity updated");
            self.emitter.cart_changed(&totals);
        }
        changed
    }

    /// Empties the cart.
    pub fn clear(&self) {
        let totals = {
            let mut inner = self.lock();
            inner.cart.clear();
            inner.cart.totals()
        };

        debug!("Cart cleared");
        self.emitter.cart_changed(&totals);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sum of discounted line totals.
    pub fn total(&self) -> Money {
        self.with_cart(Cart::total)
    }

    pub fn subtotal(&self) -> Money {
        self.with_cart(Cart::subtotal)
    }

    pub fn savings(&self) -> Money {
        self.with_cart(Cart::savings)
    }

    pub fn totals(&self) -> CartTotals {
        self.with_cart(Cart::totals)
    }

    /// Snapshot of the cart lines in insertion order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.with_cart(|cart| cart.lines().to_vec())
    }

    pub fn get(&self, item_id: &str) -> Option<CartLine> {
        self.with_cart(|cart| cart.get(item_id).cloned())
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.with_cart(Cart::item_count)
    }

    /// Number of copies across all lines (the cart badge).
    pub fn total_quantity(&self) -> u64 {
        self.with_cart(Cart::total_quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.with_cart(Cart::is_empty)
    }

    pub fn checkout_state(&self) -> CheckoutState {
        self.lock().state.clone()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Dismisses a `Succeeded` or `Failed` result. Returns `true` if the
    /// state changed.
    pub fn acknowledge(&self) -> bool {
        let acknowledged = self.lock().state.acknowledge();
        if acknowledged {
            self.emitter.checkout_state_changed(&CheckoutState::Idle);
        }
        acknowledged
    }

    /// Charges the current cart in `currency`.
    ///
    /// At most one checkout runs at a time: a call while another is in
    /// flight returns [`CheckoutError::AlreadyInProgress`] without reaching
    /// the gateway. On success the cart is emptied; on failure it is left
    /// exactly as it was and the state becomes `Failed`.
    pub async fn begin_checkout(&self, currency: Currency) -> CheckoutResult<OrderConfirmation> {
        let request = {
            let mut inner = self.lock();

            if inner.state.is_processing() {
                warn!("Checkout already in progress, rejecting");
                return Err(CheckoutError::AlreadyInProgress);
            }
            if !self.config.is_supported(&currency) {
                warn!(currency = %currency, "Checkout rejected: unsupported currency");
                return Err(CheckoutError::UnsupportedCurrency(currency.code().to_string()));
            }
            if inner.cart.is_empty() {
                warn!("Checkout rejected: cart is empty");
                return Err(CheckoutError::EmptyCart);
            }

            let request = PaymentRequest::from_cart(&inner.cart, currency);
            inner.state.start()?;
            request
        };

        info!(
            lines = request.line_items.len(),
            total = %request.currency.format(request.total),
            "Checkout started"
        );
        self.emitter.checkout_state_changed(&CheckoutState::Processing);

        let guard = InFlight::new(self);
        let outcome = self.charge(&request).await;
        guard.disarm();

        match outcome {
            Ok(receipt) => {
                let confirmation = OrderConfirmation::new(&request, receipt);
                let (state, totals) = {
                    let mut inner = self.lock();
                    inner.state.succeed(confirmation.clone())?;
                    inner.cart.clear();
                    (inner.state.clone(), inner.cart.totals())
                };

                info!(order_id = %confirmation.order_id, "Checkout succeeded");
                self.emitter.checkout_state_changed(&state);
                self.emitter.cart_changed(&totals);
                Ok(confirmation)
            }
            Err(err) => {
                let state = {
                    let mut inner = self.lock();
                    inner.state.fail(err.reason())?;
                    inner.state.clone()
                };

                warn!(
                    error = %err,
                    retryable = err.is_retryable(),
                    "Checkout failed, cart preserved"
                );
                self.emitter.checkout_state_changed(&state);
                Err(err.into())
            }
        }
    }

    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        let timeout = self.config.payment_timeout();
        match tokio::time::timeout(timeout, self.gateway.charge(request)).await {
            Ok(result) => result,
            Err(_) => Err(PaymentError::Timeout(self.config.payment.timeout_ms)),
        }
    }
}

impl std::fmt::Debug for CartLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("CartLedger")
            .field("cart", &inner.cart)
            .field("state", &inner.state)
            .finish_non_exhaustive()
    }
}

/// Puts the state back to `Idle` if a checkout future is dropped mid-flight.
struct InFlight {
    inner: Arc<Mutex<LedgerInner>>,
    emitter: Arc<dyn LedgerEventEmitter>,
    armed: bool,
}

impl InFlight {
    fn new(ledger: &CartLedger) -> Self {
        InFlight {
            inner: Arc::clone(&ledger.inner),
            emitter: Arc::clone(&ledger.emitter),
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let abandoned = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .abandon();
        if abandoned {
            warn!("Checkout cancelled before the payment finished");
            self.emitter.checkout_state_changed(&CheckoutState::Idle);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bookshelf_core::Discount;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Gateway that counts calls and can be held until released.
    #[derive(Default)]
    struct ScriptedGateway {
        calls: AtomicUsize,
        release: Option<Arc<Notify>>,
        decline: Option<String>,
    }

    impl ScriptedGateway {
        fn gated(release: Arc<Notify>) -> Self {
            ScriptedGateway {
                release: Some(release),
                ..Default::default()
            }
        }

        fn declining(reason: &str) -> Self {
            ScriptedGateway {
                decline: Some(reason.to_string()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn charge(&self, _request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(release) = &self.release {
                release.notified().await;
            }
            if let Some(reason) = &self.decline {
                return Err(PaymentError::Declined {
                    reason: reason.clone(),
                });
            }
            Ok(PaymentReceipt {
                order_id: format!("ORD-{}", n),
                transaction_id: format!("TR-{}", n),
                timestamp: Utc::now(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingEmitter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingEmitter {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl LedgerEventEmitter for RecordingEmitter {
        fn item_added(&self, line: &CartLine) {
            self.events
                .lock()
                .unwrap()
                .push(format!("added:{}x{}", line.item_id, line.quantity));
        }

        fn cart_changed(&self, totals: &CartTotals) {
            self.events
                .lock()
                .unwrap()
                .push(format!("totals:{}", totals.total.cents()));
        }

        fn checkout_state_changed(&self, state: &CheckoutState) {
            self.events.lock().unwrap().push(format!("state:{}", state.name()));
        }
    }

    fn principito() -> CatalogItem {
        CatalogItem::new("1", "El Principito", "Antoine de Saint-Exupéry", Money::from_cents(2499))
            .with_discount(Discount::from_percentage(15.0))
    }

    fn rayuela() -> CatalogItem {
        CatalogItem::new("4", "Rayuela", "Julio Cortázar", Money::from_cents(2299))
    }

    fn ledger_with(gateway: Arc<dyn PaymentGateway>) -> CartLedger {
        CartLedger::new(gateway, CheckoutConfig::default())
    }

    #[test]
    fn test_cart_operations() {
        let ledger = ledger_with(Arc::new(ScriptedGateway::default()));

        ledger.add_item(&principito());
        assert_eq!(ledger.total().cents(), 2124);
        assert_eq!(Currency::usd().format(ledger.total()), "$21.24");

        let line = ledger.add_item(&principito());
        assert_eq!(line.quantity, 2);
        assert_eq!(ledger.total().cents(), 4248);

        ledger.add_item(&rayuela());
        assert_eq!(ledger.item_count(), 2);
        assert_eq!(ledger.total_quantity(), 3);
        assert_eq!(ledger.savings().cents(), 2 * (2499 - 2124));

        assert!(ledger.update_quantity("4", 5));
        assert_eq!(ledger.get("4").unwrap().quantity, 5);

        assert!(ledger.update_quantity("1", 0));
        assert!(ledger.get("1").is_none());

        assert!(ledger.remove_item("4").is_some());
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), Money::zero());
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let emitter = Arc::new(RecordingEmitter::default());
        let ledger = ledger_with(Arc::new(ScriptedGateway::default())).with_emitter(emitter.clone());

        assert!(ledger.remove_item("missing").is_none());
        assert!(!ledger.update_quantity("missing", 3));
        assert!(emitter.events().is_empty());
    }

    #[test]
    fn test_events_on_cart_changes() {
        let emitter = Arc::new(RecordingEmitter::default());
        let ledger = ledger_with(Arc::new(ScriptedGateway::default())).with_emitter(emitter.clone());

        ledger.add_item(&principito());
        ledger.update_quantity("1", -1);

        assert_eq!(
            emitter.events(),
            vec!["added:1x1", "totals:2124", "totals:0"]
        );
    }

    #[tokio::test]
    async fn test_success_clears_cart() {
        let emitter = Arc::new(RecordingEmitter::default());
        let gateway = Arc::new(ScriptedGateway::default());
        let ledger = ledger_with(gateway.clone()).with_emitter(emitter.clone());

        ledger.add_item(&principito());
        ledger.add_item(&rayuela());

        let confirmation = ledger.begin_checkout(Currency::usd()).await.unwrap();
        assert_eq!(confirmation.total.cents(), 2124 + 2299);
        assert_eq!(confirmation.total_quantity, 2);
        assert!(ledger.is_empty());
        assert!(matches!(ledger.checkout_state(), CheckoutState::Succeeded(_)));
        assert!(ledger
            .checkout_state()
            .user_message()
            .unwrap()
            .contains("$44.23"));

        let events = emitter.events();
        assert!(events.ends_with(&[
            "state:processing".to_string(),
            "state:succeeded".to_string(),
            "totals:0".to_string(),
        ]));

        assert!(ledger.acknowledge());
        assert_eq!(ledger.checkout_state(), CheckoutState::Idle);
        assert!(!ledger.acknowledge());
    }

    #[tokio::test]
    async fn test_consecutive_orders_get_unique_ids() {
        let ledger = ledger_with(Arc::new(ScriptedGateway::default()));

        ledger.add_item(&rayuela());
        let first = ledger.begin_checkout(Currency::usd()).await.unwrap();

        // Starting again from Succeeded implicitly acknowledges.
        ledger.add_item(&rayuela());
        let second = ledger.begin_checkout(Currency::usd()).await.unwrap();

        assert_ne!(first.order_id, second.order_id);
    }

    #[tokio::test]
    async fn test_failure_preserves_cart() {
        let gateway = Arc::new(ScriptedGateway::declining("card declined"));
        let ledger = ledger_with(gateway.clone());

        ledger.add_item(&principito());
        ledger.add_item(&principito());
        let before = ledger.lines();

        let err = ledger.begin_checkout(Currency::usd()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Payment(PaymentError::Declined { .. })));
        assert!(err.offers_retry());
        assert_eq!(
            ledger.checkout_state(),
            CheckoutState::Failed {
                reason: "card declined".to_string()
            }
        );
        assert_eq!(ledger.lines(), before);
        assert_eq!(ledger.total().cents(), 4248);

        // Retry straight from Failed.
        assert!(ledger.begin_checkout(Currency::usd()).await.is_err());
        assert_eq!(gateway.calls(), 2);
        assert_eq!(ledger.lines(), before);
    }

    #[tokio::test]
    async fn test_duplicate_checkout_rejected() {
        let release = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway::gated(release.clone()));
        let ledger = ledger_with(gateway.clone());
        ledger.add_item(&rayuela());

        let first = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.begin_checkout(Currency::usd()).await })
        };
        while !ledger.checkout_state().is_processing() {
            tokio::task::yield_now().await;
        }

        let err = ledger.begin_checkout(Currency::usd()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::AlreadyInProgress));
        assert!(ledger.checkout_state().is_processing());

        release.notify_one();
        let confirmation = first.await.unwrap().unwrap();

        assert_eq!(gateway.calls(), 1);
        assert_eq!(confirmation.order_id, "ORD-1");
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_cart_edits_during_processing_are_cleared_on_success() {
        let release = Arc::new(Notify::new());
        let ledger = ledger_with(Arc::new(ScriptedGateway::gated(release.clone())));
        ledger.add_item(&rayuela());

        let pending = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.begin_checkout(Currency::usd()).await })
        };
        while !ledger.checkout_state().is_processing() {
            tokio::task::yield_now().await;
        }

        ledger.add_item(&principito());
        release.notify_one();
        let confirmation = pending.await.unwrap().unwrap();

        // Charged for the snapshot, but the whole cart is emptied.
        assert_eq!(confirmation.total.cents(), 2299);
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let gateway = Arc::new(ScriptedGateway::default());
        let ledger = ledger_with(gateway.clone());

        let err = ledger.begin_checkout(Currency::usd()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(!err.offers_retry());
        assert_eq!(ledger.checkout_state(), CheckoutState::Idle);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_currency_rejected() {
        let gateway = Arc::new(ScriptedGateway::default());
        let ledger = ledger_with(gateway.clone());
        ledger.add_item(&rayuela());

        let err = ledger
            .begin_checkout("JPY".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::UnsupportedCurrency(ref code) if code == "JPY"));
        assert_eq!(ledger.checkout_state(), CheckoutState::Idle);
        assert_eq!(gateway.calls(), 0);
        assert_eq!(ledger.item_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_checkout() {
        let mut config = CheckoutConfig::default();
        config.payment.timeout_ms = 100;
        let ledger = CartLedger::new(
            Arc::new(SimulatedGateway::new(Duration::from_secs(60))),
            config,
        );
        ledger.add_item(&principito());

        let err = ledger.begin_checkout(Currency::usd()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Payment(PaymentError::Timeout(100))));
        assert!(matches!(ledger.checkout_state(), CheckoutState::Failed { .. }));
        assert_eq!(ledger.total().cents(), 2124);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_decline() {
        let mut config = CheckoutConfig::default();
        config.payment.decline_reason = Some("insufficient funds".to_string());
        let ledger = CartLedger::simulated(config);
        ledger.add_item(&rayuela());

        assert!(ledger.begin_checkout(Currency::usd()).await.is_err());
        let message = ledger.checkout_state().user_message().unwrap();
        assert!(message.contains("insufficient funds"));
        assert_eq!(ledger.item_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_outage_fails_and_keeps_cart() {
        let mut config = CheckoutConfig::default();
        config.payment.outage = Some("maintenance window".to_string());
        let ledger = CartLedger::simulated(config);
        ledger.add_item(&principito());

        let err = ledger.begin_checkout(Currency::usd()).await.unwrap_err();
        match &err {
            CheckoutError::Payment(payment) => assert!(payment.is_retryable()),
            other => panic!("expected payment error, got {:?}", other),
        }
        assert_eq!(
            ledger.checkout_state(),
            CheckoutState::Failed {
                reason: "maintenance window".to_string()
            }
        );
        assert_eq!(ledger.total().cents(), 2124);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_checkout_returns_to_idle() {
        let emitter = Arc::new(RecordingEmitter::default());
        let ledger = CartLedger::new(
            Arc::new(SimulatedGateway::new(Duration::from_secs(2))),
            CheckoutConfig::default(),
        )
        .with_emitter(emitter.clone());
        ledger.add_item(&rayuela());

        let outcome = tokio::time::timeout(
            Duration::from_millis(10),
            ledger.begin_checkout(Currency::usd()),
        )
        .await;
        assert!(outcome.is_err());

        assert_eq!(ledger.checkout_state(), CheckoutState::Idle);
        assert_eq!(ledger.item_count(), 1);
        assert!(emitter.events().ends_with(&[
            "state:processing".to_string(),
            "state:idle".to_string(),
        ]));

        // A fresh attempt goes through.
        assert!(ledger.begin_checkout(Currency::usd()).await.is_ok());
        assert!(ledger.is_empty());
    }
}

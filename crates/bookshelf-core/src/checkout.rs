//! # Checkout State Machine
//!
//! Pure checkout types: the payment payload built from a cart, the receipt
//! a payment collaborator hands back, and the state the presentation layer
//! renders (spinner, success dialog, failure dialog).
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            start()                 succeed()                            │
//! │   Idle ───────────────► Processing ──────────► Succeeded                │
//! │    ▲                      │  ▲  │                  │                    │
//! │    │       abandon()      │  │  │ fail()           │ acknowledge()      │
//! │    ├──────────────────────┘  │  ▼                  │                    │
//! │    │                         │ Failed              │                    │
//! │    │        acknowledge()    │  │                  │                    │
//! │    ├─────────────────────────┼──┘                  │                    │
//! │    │                         │ start() (retry)     │                    │
//! │    └─────────────────────────┴─────────────────────┘                    │
//! │                                                                         │
//! │  start() is legal from every state except Processing: a new attempt    │
//! │  from Succeeded or Failed implicitly acknowledges the old result.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Currency;

// =============================================================================
// Payment Payload
// =============================================================================

/// One line of the order sent to the payment collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: String,
    pub title: String,
    pub quantity: u32,
    /// Discounted unit price, what the shopper pays per copy.
    pub unit_price: Money,
}

/// Everything the payment collaborator needs to charge an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub line_items: Vec<OrderLine>,
    pub currency: Currency,
    pub total: Money,
}

impl PaymentRequest {
    /// Snapshots the cart into a payment payload.
    pub fn from_cart(cart: &Cart, currency: Currency) -> Self {
        let line_items = cart
            .lines()
            .iter()
            .map(|line| OrderLine {
                item_id: line.item_id.clone(),
                title: line.title.clone(),
                quantity: line.quantity,
                unit_price: line.discounted_unit_price(),
            })
            .collect();

        PaymentRequest {
            line_items,
            currency,
            total: cart.total(),
        }
    }

    pub fn total_quantity(&self) -> u64 {
        self.line_items.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// What a payment collaborator returns after a successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub order_id: String,
    pub transaction_id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Order Confirmation
// =============================================================================

/// A completed order, shown in the success dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
    pub transaction_id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub currency: Currency,
    pub total: Money,
    pub total_quantity: u64,
}

impl OrderConfirmation {
    /// Combines the charged request with the collaborator's receipt.
    pub fn new(request: &PaymentRequest, receipt: PaymentReceipt) -> Self {
        OrderConfirmation {
            order_id: receipt.order_id,
            transaction_id: receipt.transaction_id,
            timestamp: receipt.timestamp,
            currency: request.currency.clone(),
            total: request.total,
            total_quantity: request.total_quantity(),
        }
    }
}

// =============================================================================
// Checkout State
// =============================================================================

/// Where the checkout flow currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Payment call in flight (spinner).
    Processing,
    /// Payment went through; the cart has been emptied.
    Succeeded(OrderConfirmation),
    /// Payment failed; the cart is untouched.
    Failed { reason: String },
}

impl CheckoutState {
    /// Short lower-case name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Processing => "processing",
            CheckoutState::Succeeded(_) => "succeeded",
            CheckoutState::Failed { .. } => "failed",
        }
    }

    #[inline]
    pub fn is_processing(&self) -> bool {
        matches!(self, CheckoutState::Processing)
    }

    /// Succeeded or Failed: a dialog is waiting for the user.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Succeeded(_) | CheckoutState::Failed { .. })
    }

    /// Enters `Processing`.
    ///
    /// Fails only when a checkout is already in flight, which is how the
    /// ledger guarantees at most one payment call at a time.
    pub fn start(&mut self) -> CoreResult<()> {
        if self.is_processing() {
            return Err(self.invalid("begin checkout"));
        }
        *self = CheckoutState::Processing;
        Ok(())
    }

    /// `Processing` → `Succeeded`.
    pub fn succeed(&mut self, confirmation: OrderConfirmation) -> CoreResult<()> {
        if !self.is_processing() {
            return Err(self.invalid("complete checkout"));
        }
        *self = CheckoutState::Succeeded(confirmation);
        Ok(())
    }

    /// `Processing` → `Failed`.
    pub fn fail(&mut self, reason: impl Into<String>) -> CoreResult<()> {
        if !self.is_processing() {
            return Err(self.invalid("fail checkout"));
        }
        *self = CheckoutState::Failed {
            reason: reason.into(),
        };
        Ok(())
    }

    /// User dismissed the result dialog. Returns `true` if the state changed.
    ///
    /// Ignored while `Idle` or `Processing`.
    pub fn acknowledge(&mut self) -> bool {
        if self.is_terminal() {
            *self = CheckoutState::Idle;
            true
        } else {
            false
        }
    }

    /// An in-flight checkout was dropped before it finished.
    pub fn abandon(&mut self) -> bool {
        if self.is_processing() {
            *self = CheckoutState::Idle;
            true
        } else {
            false
        }
    }

    /// Text for the result dialog, if there is one to show.
    pub fn user_message(&self) -> Option<String> {
        match self {
            CheckoutState::Succeeded(confirmation) => Some(format!(
                "Payment successful! Order #{} for {} processed.",
                confirmation.order_id,
                confirmation.currency.format(confirmation.total)
            )),
            CheckoutState::Failed { reason } => Some(format!(
                "There was a problem processing your payment ({}). Please try again.",
                reason
            )),
            CheckoutState::Idle | CheckoutState::Processing => None,
        }
    }

    fn invalid(&self, action: &str) -> CoreError {
        CoreError::InvalidTransition {
            action: action.to_string(),
            state: self.name().to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogItem, Discount};

    fn receipt() -> PaymentReceipt {
        PaymentReceipt {
            order_id: "ORD-1".to_string(),
            transaction_id: "TR-1".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        let principito = CatalogItem::new("1", "El Principito", "Antoine de Saint-Exupéry", Money::from_cents(2499))
            .with_discount(Discount::from_percentage(15.0));
        let rayuela = CatalogItem::new("4", "Rayuela", "Julio Cortázar", Money::from_cents(2299));
        cart.add_item(&principito);
        cart.add_item(&rayuela);
        cart.add_item(&rayuela);
        cart
    }

    #[test]
    fn test_payment_request_uses_discounted_prices() {
        let request = PaymentRequest::from_cart(&sample_cart(), Currency::usd());

        assert_eq!(request.line_items.len(), 2);
        assert_eq!(request.line_items[0].unit_price.cents(), 2124);
        assert_eq!(request.line_items[1].quantity, 2);
        assert_eq!(request.total.cents(), 2124 + 2 * 2299);
        assert_eq!(request.total_quantity(), 3);
    }

    #[test]
    fn test_happy_path() {
        let request = PaymentRequest::from_cart(&sample_cart(), Currency::usd());
        let mut state = CheckoutState::default();

        state.start().unwrap();
        assert!(state.is_processing());

        state.succeed(OrderConfirmation::new(&request, receipt())).unwrap();
        assert_eq!(state.name(), "succeeded");
        assert!(state.user_message().unwrap().contains("ORD-1"));

        assert!(state.acknowledge());
        assert_eq!(state, CheckoutState::Idle);
    }

    #[test]
    fn test_start_rejected_while_processing() {
        let mut state = CheckoutState::Processing;
        let err = state.start().unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert!(state.is_processing());
    }

    #[test]
    fn test_retry_after_failure() {
        let mut state = CheckoutState::Processing;
        state.fail("card declined").unwrap();
        assert!(state.user_message().unwrap().contains("card declined"));

        state.start().unwrap();
        assert!(state.is_processing());
    }

    #[test]
    fn test_completion_requires_processing() {
        let mut state = CheckoutState::Idle;
        assert!(state.fail("x").is_err());
        let request = PaymentRequest::from_cart(&Cart::new(), Currency::usd());
        assert!(state.succeed(OrderConfirmation::new(&request, receipt())).is_err());
        assert_eq!(state, CheckoutState::Idle);
    }

    #[test]
    fn test_acknowledge_and_abandon_are_guarded() {
        let mut state = CheckoutState::Processing;
        assert!(!state.acknowledge());
        assert!(state.abandon());
        assert_eq!(state, CheckoutState::Idle);
        assert!(!state.abandon());
        assert!(state.user_message().is_none());
    }

    #[test]
    fn test_state_serializes_with_status_tag() {
        let json = serde_json::to_value(CheckoutState::Failed {
            reason: "timeout".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "timeout");

        let json = serde_json::to_value(CheckoutState::Processing).unwrap();
        assert_eq!(json["status"], "processing");
    }
}

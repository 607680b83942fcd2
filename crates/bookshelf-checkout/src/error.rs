//! # Checkout Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Rejected     │  │     Payment             │ │
//! │  │                 │  │  (no state      │  │  (state → Failed,       │ │
//! │  │  InvalidConfig  │  │   change)       │  │   cart preserved)       │ │
//! │  │  ConfigLoad…    │  │                 │  │                         │ │
//! │  │  ConfigSave…    │  │  AlreadyIn…     │  │  Declined               │ │
//! │  │                 │  │  EmptyCart      │  │  Timeout                │ │
//! │  │                 │  │  Unsupported…   │  │  Unavailable            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal. A payment failure only affects the one checkout
//! attempt; the shopper retries by starting a fresh checkout.

use bookshelf_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Payment Error
// =============================================================================

/// Failures reported by (or on behalf of) the payment collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The provider refused the charge.
    #[error("Payment declined: {reason}")]
    Declined { reason: String },

    /// The provider did not answer in time.
    #[error("Payment timed out after {0} ms")]
    Timeout(u64),

    /// The provider could not be reached or errored internally.
    #[error("Payment provider unavailable: {0}")]
    Unavailable(String),
}

impl PaymentError {
    /// Short reason stored in `CheckoutState::Failed`.
    pub fn reason(&self) -> String {
        match self {
            PaymentError::Declined { reason } => reason.clone(),
            PaymentError::Timeout(ms) => format!("no response after {} ms", ms),
            PaymentError::Unavailable(msg) => msg.clone(),
        }
    }

    /// Whether trying again unchanged has a chance of working.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::Timeout(_) | PaymentError::Unavailable(_))
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout error type covering every way a ledger operation can fail.
#[derive(Debug, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Rejected before any payment call
    // =========================================================================
    /// A checkout is already in flight on this ledger.
    #[error("A checkout is already in progress")]
    AlreadyInProgress,

    /// Nothing to pay for.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// Currency not in the configured allow-list.
    #[error("Currency {0} is not supported")]
    UnsupportedCurrency(String),

    // =========================================================================
    // Payment
    // =========================================================================
    #[error(transparent)]
    Payment(#[from] PaymentError),

    // =========================================================================
    // Domain
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Configuration
    // =========================================================================
    #[error("Invalid checkout configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for CheckoutError {
    fn from(err: std::io::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CheckoutError {
    fn from(err: toml::de::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CheckoutError {
    fn from(err: toml::ser::Error) -> Self {
        CheckoutError::ConfigSaveFailed(err.to_string())
    }
}

impl CheckoutError {
    /// Whether the presentation layer should offer a "try again" button.
    ///
    /// Every payment failure leaves the cart intact, so the shopper can
    /// always retry; rejections need the input fixed first.
    pub fn offers_retry(&self) -> bool {
        matches!(self, CheckoutError::Payment(_))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_error_messages() {
        let err = PaymentError::Declined {
            reason: "insufficient funds".to_string(),
        };
        assert_eq!(err.to_string(), "Payment declined: insufficient funds");
        assert_eq!(err.reason(), "insufficient funds");
        assert!(!err.is_retryable());

        let err = PaymentError::Timeout(10_000);
        assert_eq!(err.reason(), "no response after 10000 ms");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_payment_error_is_transparent() {
        let err: CheckoutError = PaymentError::Unavailable("offline".to_string()).into();
        assert_eq!(err.to_string(), "Payment provider unavailable: offline");
        assert!(err.offers_retry());
    }

    #[test]
    fn test_rejections_are_not_payment_errors() {
        assert!(!CheckoutError::EmptyCart.offers_retry());
        assert!(!CheckoutError::AlreadyInProgress.offers_retry());
        assert_eq!(
            CheckoutError::UnsupportedCurrency("JPY".to_string()).to_string(),
            "Currency JPY is not supported"
        );
    }

    #[test]
    fn test_validation_converts() {
        let err: CheckoutError = ValidationError::Required {
            field: "currency".to_string(),
        }
        .into();
        assert!(matches!(err, CheckoutError::Core(CoreError::Validation(_))));
    }
}

//! # Payment Gateway
//!
//! The asynchronous collaborator that actually charges an order. The ledger
//! only ever talks to the [`PaymentGateway`] trait, so a real provider can
//! replace [`SimulatedGateway`] without touching cart or state logic.
//!
//! ## Charge Flow
//! ```text
//! CartLedger                    PaymentGateway
//!     │                               │
//!     │  charge(&PaymentRequest)      │
//!     │──────────────────────────────►│
//!     │                               │  (latency)
//!     │  Ok(PaymentReceipt)           │
//!     │◄──────────────────────────────│  or Err(PaymentError)
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use bookshelf_core::{PaymentReceipt, PaymentRequest};

use crate::config::PaymentSettings;
use crate::error::PaymentError;

// =============================================================================
// Gateway Trait
// =============================================================================

/// Charges an order with an external payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

// =============================================================================
// Simulated Gateway
// =============================================================================

/// Stand-in provider: waits a fixed latency, then approves. Configured with
/// an outage it reports itself unavailable; with a decline reason it
/// refuses every charge.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    latency: Duration,
    decline_reason: Option<String>,
    outage: Option<String>,
}

impl SimulatedGateway {
    /// Approving gateway with the given latency.
    pub fn new(latency: Duration) -> Self {
        SimulatedGateway {
            latency,
            decline_reason: None,
            outage: None,
        }
    }

    /// Gateway that declines every charge with `reason`.
    pub fn failing(latency: Duration, reason: impl Into<String>) -> Self {
        SimulatedGateway {
            latency,
            decline_reason: Some(reason.into()),
            outage: None,
        }
    }

    /// Gateway whose provider is down; every charge fails as unavailable.
    pub fn unavailable(latency: Duration, message: impl Into<String>) -> Self {
        SimulatedGateway {
            latency,
            decline_reason: None,
            outage: Some(message.into()),
        }
    }

    pub fn from_config(settings: &PaymentSettings) -> Self {
        SimulatedGateway {
            latency: Duration::from_millis(settings.latency_ms),
            decline_reason: settings.decline_reason.clone(),
            outage: settings.outage.clone(),
        }
    }

    fn receipt() -> PaymentReceipt {
        let now = Utc::now();
        let millis = now.timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();

        PaymentReceipt {
            order_id: format!("ORD-{}-{}", millis, &suffix[..8]),
            transaction_id: format!("TR-{}", millis),
            timestamp: now,
        }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::from_config(&PaymentSettings::default())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        debug!(
            lines = request.line_items.len(),
            total = %request.currency.format(request.total),
            latency_ms = self.latency.as_millis() as u64,
            "Simulating payment"
        );

        tokio::time::sleep(self.latency).await;

        if let Some(message) = &self.outage {
            warn!(message = %message, "Simulated payment provider unavailable");
            return Err(PaymentError::Unavailable(message.clone()));
        }

        if let Some(reason) = &self.decline_reason {
            warn!(reason = %reason, "Simulated payment declined");
            return Err(PaymentError::Declined {
                reason: reason.clone(),
            });
        }

        let receipt = Self::receipt();
        info!(order_id = %receipt.order_id, "Simulated payment approved");
        Ok(receipt)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Checkout saga error taxonomy.
//!
//! Every upstream failure is classified into one of these variants before
//! it reaches a caller; raw upstream error strings never cross the crate
//! boundary unclassified.

use common::PaymentOrderId;
use thiserror::Error;

/// Errors that can occur during checkout and reconciliation.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Caller input is malformed. Reported before any upstream call.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Transport failure or 5xx (or malformed response body) from an
    /// external system. Never retried internally.
    #[error("{system} unavailable: {reason}")]
    UpstreamUnavailable {
        system: &'static str,
        reason: String,
    },

    /// The order-of-record system refused to create the order.
    #[error("Order reservation rejected: {0}")]
    ReservationRejected(String),

    /// The payment gateway refused to open a session.
    #[error("Payment session creation failed: {0}")]
    PaymentSessionCreationFailed(String),

    /// The gateway has no record of the payment order ID.
    #[error("Payment order not found: {0}")]
    PaymentOrderNotFound(PaymentOrderId),

    /// The correlation tag is absent or unparseable on an
    /// otherwise-successful gateway lookup.
    #[error("Correlation tag missing: {0}")]
    CorrelationMissing(String),

    /// The order-of-record system reported a mark-paid call as redundant.
    /// Logged by the reconciler, never fatal.
    #[error("Mark-paid was a no-op: {0}")]
    ReconciliationNoop(String),
}

impl CheckoutError {
    /// Classifies a reqwest transport error against the named system.
    pub fn transport(system: &'static str, err: reqwest::Error) -> Self {
        CheckoutError::UpstreamUnavailable {
            system,
            reason: err.to_string(),
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

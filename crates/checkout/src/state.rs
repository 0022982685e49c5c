//! Checkout attempt state machine and settlement outcomes.

use serde::{Deserialize, Serialize};

/// The state of one checkout attempt.
///
/// State transitions:
/// ```text
/// Reserving ──► OpeningSession ──► AwaitingPayment
///     │               │
///     └───────────────┴──► Failed
/// ```
///
/// `AwaitingPayment` is terminal for the creation saga; settlement happens
/// later through the reconciler. There is no transition back: a failed
/// attempt is retried only by a new request, which builds a new
/// reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// Creating the order in the order-of-record system.
    #[default]
    Reserving,

    /// Order reserved; opening the payment session in the gateway.
    OpeningSession,

    /// Payment session handed to the payer (terminal for this saga).
    AwaitingPayment,

    /// A leg failed; terminal. The reservation, if any, is left
    /// `PENDING_PAYMENT` (no automatic compensation).
    Failed,
}

impl CheckoutState {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::AwaitingPayment | CheckoutState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Reserving => "Reserving",
            CheckoutState::OpeningSession => "OpeningSession",
            CheckoutState::AwaitingPayment => "AwaitingPayment",
            CheckoutState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_reserving() {
        assert_eq!(CheckoutState::default(), CheckoutState::Reserving);
    }

    #[test]
    fn terminal_states() {
        assert!(!CheckoutState::Reserving.is_terminal());
        assert!(!CheckoutState::OpeningSession.is_terminal());
        assert!(CheckoutState::AwaitingPayment.is_terminal());
        assert!(CheckoutState::Failed.is_terminal());
    }

    #[test]
    fn display() {
        assert_eq!(CheckoutState::Reserving.to_string(), "Reserving");
        assert_eq!(CheckoutState::OpeningSession.to_string(), "OpeningSession");
        assert_eq!(
            CheckoutState::AwaitingPayment.to_string(),
            "AwaitingPayment"
        );
        assert_eq!(CheckoutState::Failed.to_string(), "Failed");
    }

    #[test]
    fn serialization_roundtrip() {
        let state = CheckoutState::OpeningSession;
        let json = serde_json::to_string(&state).unwrap();
        let back: CheckoutState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}

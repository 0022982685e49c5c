//! Checkout saga across two independently-consistent external services.
//!
//! The order-of-record system owns inventory and the canonical order; the
//! payment gateway owns the money movement. They share no database and no
//! transaction protocol, so a purchase is coordinated as an explicit
//! two-leg saga:
//!
//! 1. Reserve an order (`PENDING_PAYMENT`) in the order-of-record system.
//! 2. Open a payment session in the gateway, keyed by a derived
//!    payment order ID that carries correlation tags back to the order.
//!
//! A later completion signal (browser redirect or webhook) triggers the
//! reconciler, which looks the payment up in the gateway, recovers the
//! reserved order through the correlation tags, and marks it paid.
//!
//! There is no automatic compensation: a reservation whose payment session
//! never opens (or never gets paid) stays `PENDING_PAYMENT` until handled
//! by policy outside this crate.

pub mod correlation;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod reconciler;
pub mod services;
pub mod state;

pub use correlation::CorrelationCodec;
pub use error::CheckoutError;
pub use model::{
    CheckoutRequest, CustomerDetails, FinancialStatus, LineItem, PaymentOrderStatus,
    PaymentSession, ReservedOrder,
};
pub use orchestrator::{CheckoutOrchestrator, CheckoutOutcome};
pub use reconciler::{PaymentReconciler, Settlement, require_payment_order_id};
pub use services::{
    GatewayApiClient, GatewayConfig, GatewayOrder, InMemoryOrdersService, InMemoryPaymentGateway,
    OrderReservationClient, OrdersApiClient, OrdersConfig, PaymentGatewayClient,
};
pub use state::CheckoutState;

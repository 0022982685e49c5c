//! Shared types for the checkout saga.

mod types;

pub use types::{Money, OrderId, PaymentOrderId};

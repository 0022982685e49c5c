//! Upstream client traits, HTTP implementations, and in-memory doubles.

pub mod orders;
pub mod payments;

pub use orders::{InMemoryOrdersService, OrderReservationClient, OrdersApiClient, OrdersConfig};
pub use payments::{
    GatewayApiClient, GatewayConfig, GatewayOrder, InMemoryPaymentGateway, PaymentGatewayClient,
};

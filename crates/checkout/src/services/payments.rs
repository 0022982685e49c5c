//! Payment gateway client: session creation and payment-order lookup.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{Money, PaymentOrderId};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::correlation::CorrelationTags;
use crate::error::CheckoutError;
use crate::model::{CustomerDetails, PaymentOrderStatus, PaymentSession};

/// System name used in `UpstreamUnavailable` classifications.
pub const SYSTEM: &str = "payment gateway";

/// A payment order as returned by a gateway lookup: the status enum plus
/// the correlation tags stored at session creation.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub status: PaymentOrderStatus,
    pub tags: CorrelationTags,
}

/// Typed client for the payment gateway.
#[async_trait]
pub trait PaymentGatewayClient: Send + Sync {
    /// Opens a payment session keyed by `payment_order_id`, storing `tags`
    /// on the gateway order for later recovery.
    ///
    /// Fails with `PaymentSessionCreationFailed` if the gateway rejects
    /// the request (bad amount, duplicate id, auth failure) and
    /// `UpstreamUnavailable` on transport failure.
    async fn create_session(
        &self,
        payment_order_id: &PaymentOrderId,
        amount: Money,
        currency: &str,
        customer: &CustomerDetails,
        tags: &CorrelationTags,
    ) -> Result<PaymentSession, CheckoutError>;

    /// Looks up a payment order by its ID.
    ///
    /// Fails with `PaymentOrderNotFound` if the gateway has no record and
    /// `UpstreamUnavailable` on transport failure.
    async fn get_order(
        &self,
        payment_order_id: &PaymentOrderId,
    ) -> Result<GatewayOrder, CheckoutError>;
}

/// Gateway credentials and endpoint, constructed once at process start.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway API (e.g. `https://sandbox.gateway.example/pg`).
    pub base_url: String,
    /// Application client ID.
    pub client_id: String,
    /// Application secret.
    pub client_secret: String,
    /// Gateway API version header value.
    pub api_version: String,
}

// -- Wire types (gateway REST API) --

#[derive(Serialize)]
struct CreateSessionBody<'a> {
    order_id: &'a str,
    order_amount: f64,
    order_currency: &'a str,
    customer_details: WireCustomer<'a>,
    order_tags: &'a CorrelationTags,
}

#[derive(Serialize)]
struct WireCustomer<'a> {
    customer_id: String,
    customer_name: String,
    customer_email: &'a str,
    customer_phone: &'a str,
}

#[derive(Deserialize)]
struct CreateSessionResponse {
    payment_session_id: String,
    order_status: PaymentOrderStatus,
}

#[derive(Deserialize)]
struct GetOrderResponse {
    order_status: PaymentOrderStatus,
    #[serde(default)]
    order_tags: CorrelationTags,
}

/// HTTP implementation of [`PaymentGatewayClient`].
#[derive(Clone)]
pub struct GatewayApiClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayApiClient {
    /// Creates a client with a fixed request timeout.
    pub fn new(config: GatewayConfig) -> Result<Self, CheckoutError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::transport(SYSTEM, e))?;
        Ok(Self { client, config })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-client-id", &self.config.client_id)
            .header("x-client-secret", &self.config.client_secret)
            .header("x-api-version", &self.config.api_version)
    }
}

#[async_trait]
impl PaymentGatewayClient for GatewayApiClient {
    #[tracing::instrument(skip(self, customer, tags), fields(payment_order_id = %payment_order_id))]
    async fn create_session(
        &self,
        payment_order_id: &PaymentOrderId,
        amount: Money,
        currency: &str,
        customer: &CustomerDetails,
        tags: &CorrelationTags,
    ) -> Result<PaymentSession, CheckoutError> {
        let url = format!("{}/orders", self.config.base_url);

        let body = CreateSessionBody {
            order_id: payment_order_id.as_str(),
            order_amount: amount.as_decimal(),
            order_currency: currency,
            customer_details: WireCustomer {
                customer_id: format!("CUST_{}", Uuid::new_v4().simple()),
                customer_name: customer.full_name(),
                customer_email: &customer.email,
                customer_phone: &customer.phone,
            },
            order_tags: tags,
        };

        let response = self
            .request(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckoutError::transport(SYSTEM, e))?;

        let status = response.status();
        if status.is_success() {
            let parsed: CreateSessionResponse = response
                .json()
                .await
                .map_err(|e| CheckoutError::transport(SYSTEM, e))?;
            Ok(PaymentSession {
                session_token: parsed.payment_session_id,
                status: parsed.order_status,
            })
        } else if status.is_client_error() {
            let detail = response.text().await.unwrap_or_default();
            Err(CheckoutError::PaymentSessionCreationFailed(format!(
                "{status}: {detail}"
            )))
        } else {
            Err(CheckoutError::UpstreamUnavailable {
                system: SYSTEM,
                reason: format!("unexpected status {status}"),
            })
        }
    }

    #[tracing::instrument(skip(self), fields(payment_order_id = %payment_order_id))]
    async fn get_order(
        &self,
        payment_order_id: &PaymentOrderId,
    ) -> Result<GatewayOrder, CheckoutError> {
        let url = format!("{}/orders/{}", self.config.base_url, payment_order_id);

        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| CheckoutError::transport(SYSTEM, e))?;

        let status = response.status();
        if status.is_success() {
            let parsed: GetOrderResponse = response
                .json()
                .await
                .map_err(|e| CheckoutError::transport(SYSTEM, e))?;
            Ok(GatewayOrder {
                status: parsed.order_status,
                tags: parsed.order_tags,
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(CheckoutError::PaymentOrderNotFound(
                payment_order_id.clone(),
            ))
        } else {
            Err(CheckoutError::UpstreamUnavailable {
                system: SYSTEM,
                reason: format!("unexpected status {status}"),
            })
        }
    }
}

// -- In-memory double --

#[derive(Debug)]
struct StoredPaymentOrder {
    status: PaymentOrderStatus,
    tags: CorrelationTags,
    amount: Money,
    currency: String,
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    orders: HashMap<String, StoredPaymentOrder>,
    next_session: u32,
    fail_on_create: bool,
    unavailable: bool,
}

/// In-memory payment gateway for testing.
///
/// Sessions start `ACTIVE`; tests drive the payer-side outcome with
/// [`InMemoryPaymentGateway::set_status`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to refuse the next session creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Simulates a transport failure on every call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Overrides the status of an existing payment order (e.g. to simulate
    /// the payer completing or abandoning payment).
    pub fn set_status(&self, payment_order_id: &PaymentOrderId, status: PaymentOrderStatus) {
        if let Some(order) = self
            .state
            .write()
            .unwrap()
            .orders
            .get_mut(payment_order_id.as_str())
        {
            order.status = status;
        }
    }

    /// Removes the correlation tags from an existing payment order.
    pub fn clear_tags(&self, payment_order_id: &PaymentOrderId) {
        if let Some(order) = self
            .state
            .write()
            .unwrap()
            .orders
            .get_mut(payment_order_id.as_str())
        {
            order.tags.clear();
        }
    }

    /// Returns the amount and currency recorded for a payment order.
    pub fn order_amount(&self, payment_order_id: &PaymentOrderId) -> Option<(Money, String)> {
        self.state
            .read()
            .unwrap()
            .orders
            .get(payment_order_id.as_str())
            .map(|o| (o.amount, o.currency.clone()))
    }

    /// Returns the number of sessions created.
    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns true if a payment order exists with the given ID.
    pub fn has_order(&self, payment_order_id: &PaymentOrderId) -> bool {
        self.state
            .read()
            .unwrap()
            .orders
            .contains_key(payment_order_id.as_str())
    }
}

#[async_trait]
impl PaymentGatewayClient for InMemoryPaymentGateway {
    async fn create_session(
        &self,
        payment_order_id: &PaymentOrderId,
        amount: Money,
        currency: &str,
        _customer: &CustomerDetails,
        tags: &CorrelationTags,
    ) -> Result<PaymentSession, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.unavailable {
            return Err(CheckoutError::UpstreamUnavailable {
                system: SYSTEM,
                reason: "connection refused".to_string(),
            });
        }
        if state.fail_on_create {
            return Err(CheckoutError::PaymentSessionCreationFailed(
                "order amount rejected".to_string(),
            ));
        }
        if state.orders.contains_key(payment_order_id.as_str()) {
            return Err(CheckoutError::PaymentSessionCreationFailed(format!(
                "duplicate order id {payment_order_id}"
            )));
        }

        state.next_session += 1;
        let session_token = format!("sess_{:04}", state.next_session);
        state.orders.insert(
            payment_order_id.as_str().to_string(),
            StoredPaymentOrder {
                status: PaymentOrderStatus::Active,
                tags: tags.clone(),
                amount,
                currency: currency.to_string(),
            },
        );

        Ok(PaymentSession {
            session_token,
            status: PaymentOrderStatus::Active,
        })
    }

    async fn get_order(
        &self,
        payment_order_id: &PaymentOrderId,
    ) -> Result<GatewayOrder, CheckoutError> {
        let state = self.state.read().unwrap();

        if state.unavailable {
            return Err(CheckoutError::UpstreamUnavailable {
                system: SYSTEM,
                reason: "connection refused".to_string(),
            });
        }

        state
            .orders
            .get(payment_order_id.as_str())
            .map(|o| GatewayOrder {
                status: o.status,
                tags: o.tags.clone(),
            })
            .ok_or_else(|| CheckoutError::PaymentOrderNotFound(payment_order_id.clone()))
    }
}

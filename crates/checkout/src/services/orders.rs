//! Order-of-record client: order reservation and the mark-paid transition.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::OrderId;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;
use crate::model::{CheckoutRequest, CustomerDetails, FinancialStatus, LineItem, ReservedOrder};

/// System name used in `UpstreamUnavailable` classifications.
pub const SYSTEM: &str = "order-of-record";

/// Typed client for the order-of-record system.
///
/// `reserve` creates exactly one order in `PENDING_PAYMENT`; `mark_paid`
/// requests the single `PENDING_PAYMENT → PAID` transition. Neither call
/// retries internally — retry policy belongs to the caller, since a blind
/// `reserve` retry creates a duplicate order.
#[async_trait]
pub trait OrderReservationClient: Send + Sync {
    /// Creates one order with financial status `PENDING_PAYMENT`.
    ///
    /// Fails with `ReservationRejected` if the upstream reports validation
    /// errors (invalid variant, no inventory) and `UpstreamUnavailable` on
    /// transport failure.
    async fn reserve(&self, request: &CheckoutRequest) -> Result<ReservedOrder, CheckoutError>;

    /// Marks a reserved order as paid.
    ///
    /// Idempotent from the caller's perspective: an upstream that rejects
    /// a redundant call surfaces as `ReconciliationNoop`, which callers
    /// log and treat as success.
    async fn mark_paid(&self, order_id: &OrderId) -> Result<(), CheckoutError>;
}

/// Connection settings for the order-of-record admin API, constructed once
/// at process start and passed in by reference.
#[derive(Debug, Clone)]
pub struct OrdersConfig {
    /// Base URL of the admin API (e.g. `https://shop.example/admin/api/2024-01`).
    pub base_url: String,
    /// Admin access token sent on every request.
    pub admin_token: String,
}

// -- Wire types (order-of-record admin REST API) --

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    order: CreateOrderInner<'a>,
}

#[derive(Serialize)]
struct CreateOrderInner<'a> {
    line_items: Vec<WireLineItem<'a>>,
    customer: WireCustomer<'a>,
    shipping_address: WireAddress<'a>,
    billing_address: WireAddress<'a>,
    financial_status: &'static str,
    tags: &'static str,
    note: &'static str,
}

#[derive(Serialize)]
struct WireLineItem<'a> {
    variant_id: &'a str,
    quantity: u32,
}

#[derive(Serialize)]
struct WireCustomer<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
}

#[derive(Serialize)]
struct WireAddress<'a> {
    address1: &'a str,
    city: &'a str,
    province: &'a str,
    zip: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    phone: &'a str,
}

impl<'a> WireAddress<'a> {
    fn from_customer(c: &'a CustomerDetails) -> Self {
        Self {
            address1: &c.address,
            city: &c.city,
            province: &c.state,
            zip: &c.zip,
            first_name: &c.first_name,
            last_name: &c.last_name,
            phone: &c.phone,
        }
    }
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    order: WireOrder,
}

#[derive(Deserialize)]
struct WireOrder {
    id: i64,
    name: String,
}

/// HTTP implementation of [`OrderReservationClient`] against the
/// order-of-record admin REST API.
#[derive(Clone)]
pub struct OrdersApiClient {
    client: reqwest::Client,
    config: OrdersConfig,
}

impl OrdersApiClient {
    /// Creates a client with a fixed request timeout.
    pub fn new(config: OrdersConfig) -> Result<Self, CheckoutError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::transport(SYSTEM, e))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl OrderReservationClient for OrdersApiClient {
    #[tracing::instrument(skip(self, request), fields(items = request.items.len()))]
    async fn reserve(&self, request: &CheckoutRequest) -> Result<ReservedOrder, CheckoutError> {
        let url = format!("{}/orders.json", self.config.base_url);

        let body = CreateOrderBody {
            order: CreateOrderInner {
                line_items: request
                    .items
                    .iter()
                    .map(|i| WireLineItem {
                        variant_id: &i.variant_id,
                        quantity: i.quantity,
                    })
                    .collect(),
                customer: WireCustomer {
                    first_name: &request.customer.first_name,
                    last_name: &request.customer.last_name,
                    email: &request.customer.email,
                    phone: &request.customer.phone,
                },
                shipping_address: WireAddress::from_customer(&request.customer),
                billing_address: WireAddress::from_customer(&request.customer),
                financial_status: FinancialStatus::PendingPayment.as_str(),
                tags: "online-payment",
                note: "Awaiting payment gateway confirmation",
            },
        };

        let response = self
            .client
            .post(&url)
            .header("X-Admin-Access-Token", &self.config.admin_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckoutError::transport(SYSTEM, e))?;

        let status = response.status();
        if status.is_success() {
            // A response missing the order fields is treated as an
            // unavailable upstream, not propagated as undefined data.
            let parsed: CreateOrderResponse = response
                .json()
                .await
                .map_err(|e| CheckoutError::transport(SYSTEM, e))?;
            Ok(ReservedOrder {
                id: OrderId::new(parsed.order.id.to_string()),
                code: parsed.order.name,
                items: request.items.clone(),
                financial_status: FinancialStatus::PendingPayment,
            })
        } else if status.is_client_error() {
            let detail = response.text().await.unwrap_or_default();
            Err(CheckoutError::ReservationRejected(format!(
                "{status}: {detail}"
            )))
        } else {
            Err(CheckoutError::UpstreamUnavailable {
                system: SYSTEM,
                reason: format!("unexpected status {status}"),
            })
        }
    }

    #[tracing::instrument(skip(self))]
    async fn mark_paid(&self, order_id: &OrderId) -> Result<(), CheckoutError> {
        let url = format!("{}/orders/{}/mark_paid.json", self.config.base_url, order_id);

        let response = self
            .client
            .post(&url)
            .header("X-Admin-Access-Token", &self.config.admin_token)
            .send()
            .await
            .map_err(|e| CheckoutError::transport(SYSTEM, e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            // Upstream rejected a redundant transition; the order is
            // already in its terminal financial state.
            let detail = response.text().await.unwrap_or_default();
            Err(CheckoutError::ReconciliationNoop(format!(
                "{status}: {detail}"
            )))
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
struct StoredOrder {
    code: String,
    items: Vec<LineItem>,
    financial_status: FinancialStatus,
}

#[derive(Debug, Default)]
struct InMemoryOrdersState {
    orders: HashMap<String, StoredOrder>,
    next_id: u32,
    mark_paid_calls: u32,
    fail_on_reserve: bool,
    unavailable: bool,
    reject_redundant_mark_paid: bool,
}

/// In-memory order-of-record system for testing.
///
/// Assigns sequential order identifiers starting at 1001 and keeps
/// `mark_paid` idempotent unless configured otherwise.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrdersService {
    state: Arc<RwLock<InMemoryOrdersState>>,
}

impl InMemoryOrdersService {
    /// Creates a new in-memory order-of-record service.
    pub fn new() -> Self {
        let service = Self::default();
        service.state.write().unwrap().next_id = 1000;
        service
    }

    /// Configures the service to reject the next reserve call.
    pub fn set_fail_on_reserve(&self, fail: bool) {
        self.state.write().unwrap().fail_on_reserve = fail;
    }

    /// Simulates a transport failure on every call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Configures mark-paid to reject redundant calls instead of treating
    /// them as no-ops.
    pub fn set_reject_redundant_mark_paid(&self, reject: bool) {
        self.state.write().unwrap().reject_redundant_mark_paid = reject;
    }

    /// Returns the number of orders created.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns how many times mark-paid was invoked.
    pub fn mark_paid_calls(&self) -> u32 {
        self.state.read().unwrap().mark_paid_calls
    }

    /// Returns the financial status of an order, if it exists.
    pub fn financial_status(&self, order_id: &OrderId) -> Option<FinancialStatus> {
        self.state
            .read()
            .unwrap()
            .orders
            .get(order_id.as_str())
            .map(|o| o.financial_status)
    }
}

#[async_trait]
impl OrderReservationClient for InMemoryOrdersService {
    async fn reserve(&self, request: &CheckoutRequest) -> Result<ReservedOrder, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.unavailable {
            return Err(CheckoutError::UpstreamUnavailable {
                system: SYSTEM,
                reason: "connection refused".to_string(),
            });
        }
        if state.fail_on_reserve {
            return Err(CheckoutError::ReservationRejected(
                "variant not available".to_string(),
            ));
        }

        state.next_id += 1;
        let id = state.next_id.to_string();
        let code = format!("#{id}");
        state.orders.insert(
            id.clone(),
            StoredOrder {
                code: code.clone(),
                items: request.items.clone(),
                financial_status: FinancialStatus::PendingPayment,
            },
        );

        Ok(ReservedOrder {
            id: OrderId::new(id),
            code,
            items: request.items.clone(),
            financial_status: FinancialStatus::PendingPayment,
        })
    }

    async fn mark_paid(&self, order_id: &OrderId) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();
        state.mark_paid_calls += 1;

        if state.unavailable {
            return Err(CheckoutError::UpstreamUnavailable {
                system: SYSTEM,
                reason: "connection refused".to_string(),
            });
        }

        let reject_redundant = state.reject_redundant_mark_paid;
        let order = state.orders.get_mut(order_id.as_str()).ok_or_else(|| {
            CheckoutError::UpstreamUnavailable {
                system: SYSTEM,
                reason: format!("order {order_id} not found"),
            }
        })?;

        match order.financial_status {
            FinancialStatus::PendingPayment => {
                order.financial_status = FinancialStatus::Paid;
                Ok(())
            }
            FinancialStatus::Paid if reject_redundant => Err(CheckoutError::ReconciliationNoop(
                format!("order {order_id} already paid"),
            )),
            FinancialStatus::Paid => Ok(()),
        }
    }
}

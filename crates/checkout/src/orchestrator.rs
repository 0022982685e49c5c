//! Checkout orchestrator for the two-leg creation saga.

use chrono::Utc;
use common::{OrderId, PaymentOrderId};

use crate::correlation::CorrelationCodec;
use crate::error::CheckoutError;
use crate::services::orders::OrderReservationClient;
use crate::services::payments::PaymentGatewayClient;
use crate::state::CheckoutState;

/// Composite result of a successful checkout attempt, handed back to the
/// caller so the payer's client can open the payment session.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// Session token for the payer's client.
    pub payment_session_token: String,
    /// The derived join key for this attempt.
    pub payment_order_id: PaymentOrderId,
    /// The reserved order in the order-of-record system.
    pub order_id: OrderId,
}

/// Runs the order-creation saga: reserve order → open payment session.
///
/// The saga is terminal on the first unrecoverable failure and never
/// retries a leg: a caller-level retry must submit a new request, which
/// creates a new reservation. If the session leg fails after a successful
/// reservation, the reserved order is left `PENDING_PAYMENT` — there is no
/// compensating cancellation.
pub struct CheckoutOrchestrator<R, P>
where
    R: OrderReservationClient,
    P: PaymentGatewayClient,
{
    orders: R,
    gateway: P,
    currency: String,
}

impl<R, P> CheckoutOrchestrator<R, P>
where
    R: OrderReservationClient,
    P: PaymentGatewayClient,
{
    /// Creates a new orchestrator over the two upstream clients.
    pub fn new(orders: R, gateway: P, currency: impl Into<String>) -> Self {
        Self {
            orders,
            gateway,
            currency: currency.into(),
        }
    }

    /// Executes one checkout attempt.
    ///
    /// Validates the request before any upstream call, then drives the
    /// state machine `Reserving → OpeningSession → AwaitingPayment`.
    #[tracing::instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn run(
        &self,
        request: crate::model::CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let attempt_start = std::time::Instant::now();

        request.validate().inspect_err(|e| {
            metrics::counter!("checkout_rejected_total").increment(1);
            tracing::debug!(error = %e, "checkout request rejected before any upstream call");
        })?;

        // Leg 1: reserve the order. No payment session is ever opened for
        // a non-existent order.
        tracing::info!(state = %CheckoutState::Reserving, "checkout leg started");
        let order = match self.orders.reserve(&request).await {
            Ok(order) => order,
            Err(e) => {
                metrics::counter!("checkout_failed_total", "leg" => "reserve").increment(1);
                tracing::warn!(state = %CheckoutState::Failed, error = %e, "reservation failed");
                return Err(e);
            }
        };

        // The join key and tags are computed exactly once per attempt and
        // reused by both saga legs.
        let payment_order_id =
            CorrelationCodec::payment_order_id(&order.id, Utc::now().timestamp_millis());
        let tags = CorrelationCodec::tags_for(&order);

        // Leg 2: open the payment session.
        tracing::info!(
            state = %CheckoutState::OpeningSession,
            order_id = %order.id,
            payment_order_id = %payment_order_id,
            "checkout leg started"
        );
        let session = match self
            .gateway
            .create_session(
                &payment_order_id,
                request.total_amount(),
                &self.currency,
                &request.customer,
                &tags,
            )
            .await
        {
            Ok(session) => session,
            Err(e) => {
                metrics::counter!("checkout_failed_total", "leg" => "session").increment(1);
                // The reservation is intentionally not cancelled; it stays
                // PENDING_PAYMENT until handled by policy outside this
                // crate.
                tracing::warn!(
                    state = %CheckoutState::Failed,
                    order_id = %order.id,
                    error = %e,
                    "payment session failed; reserved order left pending"
                );
                return Err(e);
            }
        };

        metrics::counter!("checkout_completed_total").increment(1);
        metrics::histogram!("checkout_duration_seconds")
            .record(attempt_start.elapsed().as_secs_f64());
        tracing::info!(
            state = %CheckoutState::AwaitingPayment,
            order_id = %order.id,
            payment_order_id = %payment_order_id,
            "checkout attempt handed to payer"
        );

        Ok(CheckoutOutcome {
            payment_session_token: session.session_token,
            payment_order_id,
            order_id: order.id,
        })
    }
}

//! Payment reconciler: settles a reserved order from a completion signal.

use common::{OrderId, PaymentOrderId};

use crate::correlation::CorrelationCodec;
use crate::error::CheckoutError;
use crate::model::PaymentOrderStatus;
use crate::services::orders::OrderReservationClient;
use crate::services::payments::PaymentGatewayClient;

/// Terminal outcome of one reconciliation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The gateway reported `PAID` and the reserved order was marked paid.
    SettledPaid {
        /// The order-of-record order that was settled.
        order_id: OrderId,
    },
    /// The gateway reported a non-paid status; the reserved order was not
    /// touched and stays `PENDING_PAYMENT` for a later retry or manual
    /// review.
    SettledUnpaid {
        /// The status the gateway reported.
        status: PaymentOrderStatus,
    },
}

impl Settlement {
    /// Returns true if the payment settled.
    pub fn is_paid(&self) -> bool {
        matches!(self, Settlement::SettledPaid { .. })
    }
}

/// Validates the payment order ID carried by a completion signal.
///
/// Fails with `Validation` when the identifier is absent or empty; no
/// upstream is contacted in that case.
pub fn require_payment_order_id(raw: Option<&str>) -> Result<PaymentOrderId, CheckoutError> {
    match raw {
        Some(id) if !id.is_empty() => Ok(PaymentOrderId::new(id)),
        _ => Err(CheckoutError::Validation(
            "payment order id is required".to_string(),
        )),
    }
}

/// Runs the payment-verification saga.
///
/// Triggered by a completion signal carrying only a payment order ID —
/// a browser redirect and an asynchronous notification both funnel through
/// [`PaymentReconciler::reconcile`]. Reconciliation is safe to invoke
/// repeatedly (and concurrently) for the same payment order ID: each
/// invocation independently re-derives the correlation, and `mark_paid` is
/// idempotent on the order-of-record side.
pub struct PaymentReconciler<R, P>
where
    R: OrderReservationClient,
    P: PaymentGatewayClient,
{
    orders: R,
    gateway: P,
}

impl<R, P> PaymentReconciler<R, P>
where
    R: OrderReservationClient,
    P: PaymentGatewayClient,
{
    /// Creates a new reconciler over the two upstream clients.
    pub fn new(orders: R, gateway: P) -> Self {
        Self { orders, gateway }
    }

    /// Reconciles one payment outcome onto its reserved order.
    #[tracing::instrument(skip(self), fields(payment_order_id = %payment_order_id))]
    pub async fn reconcile(
        &self,
        payment_order_id: &PaymentOrderId,
    ) -> Result<Settlement, CheckoutError> {
        metrics::counter!("reconciliations_total").increment(1);

        let gateway_order = self.gateway.get_order(payment_order_id).await.inspect_err(|e| {
            metrics::counter!("reconciliation_failed_total", "stage" => "lookup").increment(1);
            tracing::warn!(error = %e, "gateway lookup failed; payment can be re-verified later");
        })?;

        if !gateway_order.status.is_paid() {
            metrics::counter!("reconciliations_unpaid_total").increment(1);
            tracing::info!(status = %gateway_order.status, "payment not settled; order left pending");
            return Ok(Settlement::SettledUnpaid {
                status: gateway_order.status,
            });
        }

        // PAID: recover the reserved order through the correlation tags.
        // A paid payment with no resolvable order is never marked anywhere.
        let order_id = CorrelationCodec::resolve_order_id(&gateway_order.tags).inspect_err(|e| {
            metrics::counter!("reconciliation_failed_total", "stage" => "correlation").increment(1);
            tracing::error!(error = %e, "paid payment order has no resolvable correlation tag");
        })?;

        match self.orders.mark_paid(&order_id).await {
            Ok(()) => {}
            Err(CheckoutError::ReconciliationNoop(reason)) => {
                // The order is already in its terminal paid state.
                metrics::counter!("reconciliation_noop_total").increment(1);
                tracing::warn!(order_id = %order_id, %reason, "redundant mark-paid observed");
            }
            Err(e) => {
                metrics::counter!("reconciliation_failed_total", "stage" => "mark_paid")
                    .increment(1);
                return Err(e);
            }
        }

        metrics::counter!("reconciliations_paid_total").increment(1);
        tracing::info!(order_id = %order_id, "order settled as paid");
        Ok(Settlement::SettledPaid { order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckoutRequest, CustomerDetails, FinancialStatus, LineItem};
    use crate::orchestrator::CheckoutOrchestrator;
    use crate::services::orders::InMemoryOrdersService;
    use crate::services::payments::InMemoryPaymentGateway;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            items: vec![LineItem {
                variant_id: "44416942178349".to_string(),
                quantity: 1,
            }],
            customer: CustomerDetails {
                first_name: "Asha".to_string(),
                last_name: "Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "+911234567890".to_string(),
                address: "12 MG Road".to_string(),
                city: "Bengaluru".to_string(),
                state: "KA".to_string(),
                zip: "560001".to_string(),
            },
            total: 110.0,
        }
    }

    async fn checkout(
        orders: &InMemoryOrdersService,
        gateway: &InMemoryPaymentGateway,
    ) -> crate::orchestrator::CheckoutOutcome {
        CheckoutOrchestrator::new(orders.clone(), gateway.clone(), "INR")
            .run(request())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn paid_payment_settles_the_order() {
        let orders = InMemoryOrdersService::new();
        let gateway = InMemoryPaymentGateway::new();
        let outcome = checkout(&orders, &gateway).await;

        gateway.set_status(&outcome.payment_order_id, PaymentOrderStatus::Paid);

        let reconciler = PaymentReconciler::new(orders.clone(), gateway.clone());
        let settlement = reconciler.reconcile(&outcome.payment_order_id).await.unwrap();

        assert_eq!(
            settlement,
            Settlement::SettledPaid {
                order_id: outcome.order_id.clone()
            }
        );
        assert_eq!(
            orders.financial_status(&outcome.order_id),
            Some(FinancialStatus::Paid)
        );
    }

    #[tokio::test]
    async fn active_payment_never_marks_paid() {
        let orders = InMemoryOrdersService::new();
        let gateway = InMemoryPaymentGateway::new();
        let outcome = checkout(&orders, &gateway).await;

        let reconciler = PaymentReconciler::new(orders.clone(), gateway.clone());
        let settlement = reconciler.reconcile(&outcome.payment_order_id).await.unwrap();

        assert_eq!(
            settlement,
            Settlement::SettledUnpaid {
                status: PaymentOrderStatus::Active
            }
        );
        assert_eq!(orders.mark_paid_calls(), 0);
        assert_eq!(
            orders.financial_status(&outcome.order_id),
            Some(FinancialStatus::PendingPayment)
        );
    }

    #[tokio::test]
    async fn expired_payment_never_marks_paid() {
        let orders = InMemoryOrdersService::new();
        let gateway = InMemoryPaymentGateway::new();
        let outcome = checkout(&orders, &gateway).await;

        gateway.set_status(&outcome.payment_order_id, PaymentOrderStatus::Expired);

        let reconciler = PaymentReconciler::new(orders.clone(), gateway.clone());
        let settlement = reconciler.reconcile(&outcome.payment_order_id).await.unwrap();

        assert!(!settlement.is_paid());
        assert_eq!(orders.mark_paid_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_payment_order_contacts_no_order_system() {
        let orders = InMemoryOrdersService::new();
        let gateway = InMemoryPaymentGateway::new();

        let reconciler = PaymentReconciler::new(orders.clone(), gateway);
        let result = reconciler
            .reconcile(&PaymentOrderId::new("ORDER_9999_0000"))
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::PaymentOrderNotFound(_))
        ));
        assert_eq!(orders.mark_paid_calls(), 0);
    }

    #[tokio::test]
    async fn missing_correlation_tag_marks_nothing() {
        let orders = InMemoryOrdersService::new();
        let gateway = InMemoryPaymentGateway::new();
        let outcome = checkout(&orders, &gateway).await;

        gateway.set_status(&outcome.payment_order_id, PaymentOrderStatus::Paid);
        gateway.clear_tags(&outcome.payment_order_id);

        let reconciler = PaymentReconciler::new(orders.clone(), gateway);
        let result = reconciler.reconcile(&outcome.payment_order_id).await;

        assert!(matches!(
            result,
            Err(CheckoutError::CorrelationMissing(_))
        ));
        assert_eq!(orders.mark_paid_calls(), 0);
        assert_eq!(
            orders.financial_status(&outcome.order_id),
            Some(FinancialStatus::PendingPayment)
        );
    }

    #[tokio::test]
    async fn redundant_mark_paid_is_tolerated() {
        let orders = InMemoryOrdersService::new();
        orders.set_reject_redundant_mark_paid(true);
        let gateway = InMemoryPaymentGateway::new();
        let outcome = checkout(&orders, &gateway).await;

        gateway.set_status(&outcome.payment_order_id, PaymentOrderStatus::Paid);

        let reconciler = PaymentReconciler::new(orders.clone(), gateway.clone());
        let first = reconciler.reconcile(&outcome.payment_order_id).await.unwrap();
        let second = reconciler.reconcile(&outcome.payment_order_id).await.unwrap();

        assert!(first.is_paid());
        assert!(second.is_paid());
        assert_eq!(orders.mark_paid_calls(), 2);
        assert_eq!(
            orders.financial_status(&outcome.order_id),
            Some(FinancialStatus::Paid)
        );
    }

    #[test]
    fn absent_signal_id_is_a_validation_error() {
        assert!(matches!(
            require_payment_order_id(None),
            Err(CheckoutError::Validation(_))
        ));
        assert!(matches!(
            require_payment_order_id(Some("")),
            Err(CheckoutError::Validation(_))
        ));
        let id = require_payment_order_id(Some("ORDER_1001_1234")).unwrap();
        assert_eq!(id.as_str(), "ORDER_1001_1234");
    }
}

//! Checkout creation and payment-completion endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Redirect;
use checkout::{
    CheckoutOrchestrator, CheckoutRequest, OrderReservationClient, PaymentGatewayClient,
    PaymentReconciler, Settlement, require_payment_order_id,
};
use serde::{Deserialize, Serialize};

use crate::config::RedirectConfig;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R, P>
where
    R: OrderReservationClient,
    P: PaymentGatewayClient,
{
    pub orchestrator: CheckoutOrchestrator<R, P>,
    pub reconciler: PaymentReconciler<R, P>,
    pub redirects: RedirectConfig,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub payment_session_token: String,
    pub payment_order_id: String,
    pub order_id: String,
}

#[derive(Deserialize)]
pub struct CompleteParams {
    pub order_id: Option<String>,
}

// -- Handlers --

/// POST /checkout — run the order-creation saga and hand back the payment
/// session for the payer's client.
///
/// A body that fails to deserialize (missing or mistyped field) is the
/// caller's fault and answers 400 with the structured error body, same as
/// a semantically invalid request.
#[tracing::instrument(skip(state, body))]
pub async fn create<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    R: OrderReservationClient + 'static,
    P: PaymentGatewayClient + 'static,
{
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let outcome = state.orchestrator.run(req).await?;

    Ok(Json(CheckoutResponse {
        payment_session_token: outcome.payment_session_token,
        payment_order_id: outcome.payment_order_id.to_string(),
        order_id: outcome.order_id.to_string(),
    }))
}

/// GET /checkout/complete?order_id= — reconcile a payment completion
/// signal.
///
/// Reached by browser navigation, so every outcome is a redirect carrying
/// at most a coarse error code; upstream errors never reach the payer.
#[tracing::instrument(skip(state, params))]
pub async fn complete<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Query(params): Query<CompleteParams>,
) -> Redirect
where
    R: OrderReservationClient + 'static,
    P: PaymentGatewayClient + 'static,
{
    let payment_order_id = match require_payment_order_id(params.order_id.as_deref()) {
        Ok(id) => id,
        Err(_) => return failure(&state.redirects, "invalid_order"),
    };

    match state.reconciler.reconcile(&payment_order_id).await {
        Ok(Settlement::SettledPaid { order_id }) => {
            Redirect::to(&format!("{}?id={}", state.redirects.success, order_id))
        }
        Ok(Settlement::SettledUnpaid { .. }) => failure(&state.redirects, "payment_incomplete"),
        Err(_) => failure(&state.redirects, "verification_error"),
    }
}

fn failure(redirects: &RedirectConfig, code: &str) -> Redirect {
    Redirect::to(&format!("{}?error={}", redirects.failure, code))
}

//! HTTP API server for the checkout saga.
//!
//! Exposes the order-creation endpoint and the browser-facing payment
//! completion endpoint, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    CheckoutOrchestrator, GatewayApiClient, InMemoryOrdersService, InMemoryPaymentGateway,
    OrderReservationClient, OrdersApiClient, PaymentGatewayClient, PaymentReconciler,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::checkout::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, P>(state: Arc<AppState<R, P>>, metrics_handle: PrometheusHandle) -> Router
where
    R: OrderReservationClient + 'static,
    P: PaymentGatewayClient + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout", post(routes::checkout::create::<R, P>))
        .route("/checkout/complete", get(routes::checkout::complete::<R, P>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by the HTTP upstream clients.
pub fn create_state(
    config: &Config,
) -> Result<Arc<AppState<OrdersApiClient, GatewayApiClient>>, checkout::CheckoutError> {
    let orders = OrdersApiClient::new(config.orders.clone())?;
    let gateway = GatewayApiClient::new(config.gateway.clone())?;

    Ok(Arc::new(AppState {
        orchestrator: CheckoutOrchestrator::new(orders.clone(), gateway.clone(), config.currency.clone()),
        reconciler: PaymentReconciler::new(orders, gateway),
        redirects: config.redirects.clone(),
    }))
}

/// Creates application state backed by the in-memory doubles, returning
/// handles so tests can drive upstream behavior.
pub fn create_in_memory_state(
    config: &Config,
) -> (
    Arc<AppState<InMemoryOrdersService, InMemoryPaymentGateway>>,
    InMemoryOrdersService,
    InMemoryPaymentGateway,
) {
    let orders = InMemoryOrdersService::new();
    let gateway = InMemoryPaymentGateway::new();

    let state = Arc::new(AppState {
        orchestrator: CheckoutOrchestrator::new(orders.clone(), gateway.clone(), config.currency.clone()),
        reconciler: PaymentReconciler::new(orders.clone(), gateway.clone()),
        redirects: config.redirects.clone(),
    });

    (state, orders, gateway)
}

pub mod bookings;
pub mod health;
pub mod scan;

use crate::config::Config;
use crate::db::Repository;
use crate::provider::PaymentProvider;
use crate::scanner::Scanner;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub scanner: Arc<Scanner>,
    pub provider: Arc<dyn PaymentProvider>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        config: Config,
        scanner: Arc<Scanner>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            repo,
            config,
            scanner,
            provider,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/scans", post(scan::post_scan))
        .route("/v1/bookings", post(bookings::create_booking))
        .route("/v1/bookings/:id", get(bookings::get_booking))
        .route(
            "/v1/bookings/:id/payment-status",
            get(bookings::get_payment_status),
        )
        .route("/v1/bookings/:id/checkout", post(bookings::create_checkout))
        .layer(cors)
        .with_state(state)
}

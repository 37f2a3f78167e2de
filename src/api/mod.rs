//! REST API for computed plans.
//!
//! Provides three GET endpoints:
//! - `/plans` — summary of every computed plan
//! - `/plans/{kind}` — one full plan (`cost`, `eco`, or `comfort`)
//! - `/plans/{kind}/schedule` — day schedules with optional range filtering

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::plan::types::{EcoPlan, Plan};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after plan generation completes and wrapped in `Arc`
/// — no locks needed since all data is read-only.
pub struct AppState {
    /// The Cost plan.
    pub cost: Plan,
    /// The Eco plan with its emission metrics.
    pub eco: EcoPlan,
    /// The Comfort plan.
    pub comfort: Plan,
    /// Household average monthly cost, for savings figures.
    pub avg_monthly_cost: f64,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/plans", get(handlers::get_plans))
        .route("/plans/{kind}", get(handlers::get_plan))
        .route("/plans/{kind}/schedule", get(handlers::get_schedule))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}

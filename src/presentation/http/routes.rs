//! Route Configuration
//!
//! One router per binary. Each carries the operational endpoints
//! (`/health`, `/health/live`, `/health/ready`, `/metrics`).

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{health, messages, metrics::metrics_handler, users};
use crate::presentation::gateway::proxy_handler;
use crate::presentation::middleware::{auth_middleware, track_metrics};
use crate::startup::{GatewayState, MessageServiceState, UserServiceState};

/// User service router
pub fn user_service_router(state: UserServiceState) -> Router {
    let public = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login));

    let protected = Router::new()
        .route("/get-all", get(users::get_all))
        .route("/get-current-user-id", get(users::get_current_user_id))
        .route("/delete", post(users::delete))
        .route("/is-user-exist", post(users::is_user_exist))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/users", public.merge(protected))
        .merge(operational_routes())
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Message service router (every message route requires a token)
pub fn message_service_router(state: MessageServiceState) -> Router {
    let protected = Router::new()
        .route("/get-messages", get(messages::get_messages))
        .route("/send-message", post(messages::send_message))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/messages", protected)
        .merge(operational_routes())
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Gateway router: operational endpoints locally, everything else upstream
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .merge(operational_routes())
        .fallback(proxy_handler)
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Health probes and the Prometheus endpoint
fn operational_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    health::HealthState: FromRef<S>,
{
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(metrics_handler))
}

//! Health, readiness and metrics endpoint tests

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use messenger::config::GatewaySettings;
use messenger::presentation::gateway::UpstreamProxy;
use messenger::presentation::http::handlers::health::{
    DependencyCheck, HealthState, HealthStatus, ServiceHealth,
};
use messenger::presentation::http::routes;
use messenger::startup::{GatewayState, MessageServiceState};

use crate::common::{send, TestApp};

struct Down;

#[async_trait]
impl DependencyCheck for Down {
    async fn check(&self) -> ServiceHealth {
        ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some("down".into()),
        }
    }
}

fn gateway(health: HealthState) -> axum::Router {
    let settings = GatewaySettings {
        user_service_url: "http://127.0.0.1:9".into(),
        message_service_url: "http://127.0.0.1:9".into(),
        timeout_secs: 1,
    };
    let client = UpstreamProxy::client(&settings).unwrap();
    routes::gateway_router(GatewayState {
        proxy: Arc::new(UpstreamProxy::new(client, &settings)),
        health,
    })
}

#[tokio::test]
async fn probes_answer_without_dependencies() {
    let app = TestApp::new();

    for router in [&app.user_router, &app.message_router] {
        let health = app.get(router, "/health", None).await;
        let live = app.get(router, "/health/live", None).await;
        let ready = app.get(router, "/health/ready", None).await;

        assert_eq!(health.body["status"], "healthy");
        assert_eq!(live.body, json!({ "status": "alive" }));
        assert_eq!(ready.status, StatusCode::OK);
        assert_eq!(ready.body["status"], "healthy");
    }
}

#[tokio::test]
async fn critical_failure_makes_service_unready() {
    let app = TestApp::new();
    let router = routes::message_service_router(MessageServiceState {
        messages: Arc::new(NoMessages),
        verifier: crate::common::verifier(),
        health: HealthState::new().with_check("database", true, Down),
    });

    let ready = app.get(&router, "/health/ready", None).await;

    assert_eq!(ready.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ready.body["checks"]["database"]["message"], "down");
}

#[tokio::test]
async fn non_critical_failure_only_degrades() {
    let router = gateway(HealthState::new().with_check("cache", false, Down));

    let ready = send(&router, Method::GET, "/health/ready", None, None).await;

    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["status"], "degraded");
}

#[tokio::test]
async fn metrics_count_requests_by_route() {
    let app = TestApp::new();
    app.get(&app.user_router, "/health/live", None).await;

    let metrics = app.get(&app.user_router, "/metrics", None).await;

    assert_eq!(metrics.status, StatusCode::OK);
    let text = metrics.body.as_str().unwrap();
    assert!(text.contains("messenger_http_requests_total"));
    assert!(text.contains(r#"path="/health/live""#));
}

#[tokio::test]
async fn gateway_rejects_unknown_prefix() {
    let router = gateway(HealthState::new());

    let response = send(&router, Method::GET, "/admin/stats", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Gateway.Route");
}

#[tokio::test]
async fn gateway_reports_unreachable_upstream() {
    let router = gateway(HealthState::new());

    let response = send(
        &router,
        Method::POST,
        "/users/login",
        Some(json!({ "email": "a@x.com", "password": "P@ssw0rd1" })),
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.body,
        json!({
            "code": "BadGateway",
            "message": "Gateway.Upstream",
            "description": "Upstream service not responding"
        })
    );
}

struct NoMessages;

#[async_trait]
impl messenger::application::services::MessageService for NoMessages {
    async fn send_message(
        &self,
        _sender_id: uuid::Uuid,
        _recipient_email: &str,
        _text: &str,
    ) -> Result<(), messenger::application::services::MessageError> {
        Ok(())
    }

    async fn get_messages(
        &self,
        _recipient_id: uuid::Uuid,
    ) -> Result<Vec<messenger::domain::Message>, messenger::application::services::MessageError>
    {
        Ok(Vec::new())
    }
}

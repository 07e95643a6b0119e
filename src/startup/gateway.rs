use std::sync::Arc;

use anyhow::Result;

use super::{Application, GatewayState};
use crate::config::Settings;
use crate::presentation::gateway::UpstreamProxy;
use crate::presentation::http::handlers::health::{HealthState, UpstreamCheck};
use crate::presentation::http::routes;

impl Application {
    /// Build the gateway in front of the user and message services.
    pub async fn build_gateway(settings: Settings) -> Result<Self> {
        let client = UpstreamProxy::client(&settings.gateway)?;

        let health = HealthState::new()
            .with_check(
                "user-service",
                true,
                UpstreamCheck::new(client.clone(), &settings.gateway.user_service_url),
            )
            .with_check(
                "message-service",
                true,
                UpstreamCheck::new(client.clone(), &settings.gateway.message_service_url),
            );

        let state = GatewayState {
            proxy: Arc::new(UpstreamProxy::new(client, &settings.gateway)),
            health,
        };

        Self::bind(&settings, routes::gateway_router(state)).await
    }
}

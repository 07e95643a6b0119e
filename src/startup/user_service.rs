use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use super::{Application, UserServiceState};
use crate::application::services::{TokenIssuer, TokenVerifier, UserService, UserServiceImpl};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::events::{create_redis_client, OutboxRelay, RedisEventPublisher};
use crate::infrastructure::repositories::{
    PgOutboxRepository, PgRoleRepository, PgUserRepository,
};
use crate::presentation::http::handlers::health::{HealthState, PostgresCheck, RedisCheck};
use crate::presentation::http::routes;

impl Application {
    /// Build the user service and start its outbox relay.
    pub async fn build_user_service(settings: Settings) -> Result<Self> {
        let private_key_path = settings
            .jwt
            .private_key_path
            .as_deref()
            .context("jwt.private_key_path must be set for the user service")?;
        let issuer = Arc::new(TokenIssuer::from_file(private_key_path, &settings.jwt)?);
        let verifier = Arc::new(TokenVerifier::from_file(
            &settings.jwt.public_key_path,
            &settings.jwt,
        )?);
        tracing::info!("Signing keys loaded");

        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");
        if settings.database.run_migrations {
            database::run_user_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        let redis = create_redis_client(&settings.redis).await?;
        let publisher = Arc::new(RedisEventPublisher::new(
            redis.clone(),
            settings.events.stream.clone(),
        ));

        let users: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgRoleRepository::new(db.clone())),
            issuer,
        ));
        let relay = OutboxRelay::new(
            Arc::new(PgOutboxRepository::new(db.clone())),
            publisher,
            settings.events.batch_size,
            Duration::from_millis(settings.events.poll_interval_ms),
        );

        let state = UserServiceState {
            users,
            verifier,
            health: HealthState::new()
                .with_check("database", true, PostgresCheck(db))
                .with_check("redis", false, RedisCheck(redis)),
        };

        let mut app = Self::bind(&settings, routes::user_service_router(state)).await?;

        let shutdown = app.shutdown_receiver();
        app.workers.push(tokio::spawn(relay.run(shutdown)));

        Ok(app)
    }
}

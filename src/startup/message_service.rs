use std::sync::Arc;

use anyhow::Result;

use super::{Application, MessageServiceState};
use crate::application::events::EventDispatcher;
use crate::application::services::{MessageService, MessageServiceImpl, TokenVerifier};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::events::{create_redis_client, ensure_consumer_group, StreamConsumer};
use crate::infrastructure::repositories::{PgAvailableUserRepository, PgMessageRepository};
use crate::presentation::http::handlers::health::{HealthState, PostgresCheck, RedisCheck};
use crate::presentation::http::routes;

impl Application {
    /// Build the message service and start its user event consumer.
    pub async fn build_message_service(settings: Settings) -> Result<Self> {
        let verifier = Arc::new(TokenVerifier::from_file(
            &settings.jwt.public_key_path,
            &settings.jwt,
        )?);

        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");
        if settings.database.run_migrations {
            database::run_message_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        let redis = create_redis_client(&settings.redis).await?;
        // Stream reads get their own connection so probes never queue behind them.
        let mut consumer_conn = create_redis_client(&settings.redis).await?;
        ensure_consumer_group(
            &mut consumer_conn,
            &settings.events.stream,
            &settings.events.group,
        )
        .await?;

        let replica = Arc::new(PgAvailableUserRepository::new(db.clone()));
        let messages: Arc<dyn MessageService> = Arc::new(MessageServiceImpl::new(
            Arc::new(PgMessageRepository::new(db.clone())),
            replica.clone(),
        ));

        let state = MessageServiceState {
            messages,
            verifier,
            health: HealthState::new()
                .with_check("database", true, PostgresCheck(db))
                .with_check("redis", false, RedisCheck(redis)),
        };

        let mut app = Self::bind(&settings, routes::message_service_router(state)).await?;

        let consumer = StreamConsumer::new(
            consumer_conn,
            settings.events.clone(),
            Arc::new(EventDispatcher::for_replica(replica)),
        );
        let shutdown = app.shutdown_receiver();
        app.workers.push(tokio::spawn(async move {
            if let Err(e) = consumer.run(shutdown).await {
                tracing::error!(error = %e, "Event consumer failed");
            }
        }));

        Ok(app)
    }
}

//! # Messenger Gateway

use anyhow::Result;
use tracing::info;

use messenger::config::Settings;
use messenger::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    messenger::telemetry::init_tracing();

    info!("Starting gateway...");

    let settings = Settings::load("gateway")?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build_gateway(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}

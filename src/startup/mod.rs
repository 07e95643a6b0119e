//! Application Startup
//!
//! Builds one of the three binaries (user service, message service, gateway)
//! from settings and serves it until Ctrl-C or SIGTERM.

mod gateway;
mod message_service;
mod user_service;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{extract::FromRef, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::services::{MessageService, TokenVerifier, UserService};
use crate::config::Settings;
use crate::presentation::gateway::UpstreamProxy;
use crate::presentation::http::handlers::health::{init_server_start, HealthState};
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};

/// State shared by the user service handlers
#[derive(Clone, FromRef)]
pub struct UserServiceState {
    pub users: Arc<dyn UserService>,
    pub verifier: Arc<TokenVerifier>,
    pub health: HealthState,
}

/// State shared by the message service handlers
#[derive(Clone, FromRef)]
pub struct MessageServiceState {
    pub messages: Arc<dyn MessageService>,
    pub verifier: Arc<TokenVerifier>,
    pub health: HealthState,
}

/// State shared by the gateway handlers
#[derive(Clone, FromRef)]
pub struct GatewayState {
    pub proxy: Arc<UpstreamProxy>,
    pub health: HealthState,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl Application {
    /// Bind the listener and wrap `router` in the shared HTTP layers.
    async fn bind(settings: &Settings, router: Router) -> Result<Self> {
        init_server_start();

        let router = router
            .layer(create_trace_layer())
            .layer(create_cors_layer(&settings.cors));

        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            listener,
            router,
            shutdown,
            workers: Vec::new(),
        })
    }

    /// Receiver that flips to `true` once the server starts shutting down.
    fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Run the server until stopped, then wait for background workers
    pub async fn run_until_stopped(self) -> Result<()> {
        let shutdown = self.shutdown;

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = shutdown.send(true);
            })
            .await?;

        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Background worker panicked");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
